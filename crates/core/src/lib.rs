//! Core types and traits for the compliance assistant
//!
//! This crate provides the types shared by every other crate:
//! - Knowledge rows and their routing flags
//! - Search hits, responses and match outcomes
//! - The `Retriever` trait the HTTP layer is written against

pub mod knowledge;
pub mod search;
pub mod traits;

pub use knowledge::{KnowledgeRow, Routing, NOT_SPECIFIED, UNKNOWN_TAB};
pub use search::{
    CategoryPreference, MatchOutcome, QueryResult, ScoredRow, SearchHit, SearchOptions,
    SearchResponse,
};
pub use traits::Retriever;

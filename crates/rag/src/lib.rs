//! Compliance matrix retrieval
//!
//! Features:
//! - Alias-tolerant loading of spreadsheet-exported knowledge rows
//! - Text normalization and query tokenization with stopword filtering
//! - Hand-authored query expansion (phrase synonyms, trigger rules)
//! - Additive, explainable row scoring with domain phrase boosts
//! - Stable full-scan ranking with an acceptance threshold
//! - Instruction splitting into numbered steps
//! - Request intent classification (small talk, capability, procedure)
//! - Core `Retriever` trait implementation

pub mod domain_boost;
pub mod intent;
pub mod knowledge_loader;
pub mod query_expansion;
pub mod retriever;
pub mod scorer;
pub mod steps;
pub mod text;

pub use domain_boost::{BoostResult, DomainBoostConfig, DomainBooster};
pub use intent::{category_preference, classify, QueryIntent};
pub use knowledge_loader::{load_rows, parse_packed_text, CanonicalField, KnowledgeLoader, PackedFields};
pub use query_expansion::{ExpandedQuery, ExpansionStats, QueryExpander, QueryExpansionConfig};
pub use retriever::{ExplainedHit, MatrixRetriever, RetrieverConfig};
pub use scorer::{IndexedRow, PreparedQuery, ScoreBreakdown, Scorer, ScoringWeights};
pub use steps::split_steps;
pub use text::{normalize, tokenize};

use thiserror::Error;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Malformed knowledge base: {0}")]
    MalformedKnowledgeBase(String),

    #[error("Knowledge base is empty: {0}")]
    EmptyKnowledgeBase(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

//! Core traits
//!
//! ```text
//! Retrieval:
//!   - Retriever: question → ranked knowledge rows / best match
//! ```

mod retriever;

pub use retriever::Retriever;

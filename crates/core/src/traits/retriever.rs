//! Retriever trait

use crate::search::{MatchOutcome, SearchOptions, SearchResponse};

/// Matches free-text questions against a loaded knowledge base
///
/// Implementations hold an immutable index and are shared across concurrent
/// requests without locking. Neither method fails: empty or unmatched
/// questions produce empty hits / `MatchOutcome::NotCovered`.
pub trait Retriever: Send + Sync {
    /// Rank rows for a question, best first
    fn search(&self, question: &str, options: &SearchOptions) -> SearchResponse;

    /// Best acceptable row for a question, with its extracted steps
    fn accept_best(&self, question: &str, options: &SearchOptions) -> MatchOutcome;

    /// Number of loaded rows
    fn row_count(&self) -> usize;
}

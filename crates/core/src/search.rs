//! Search request and result types

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::knowledge::{KnowledgeRow, Routing};

/// Preferred row category for a request
///
/// When at least one acceptable candidate belongs to the preferred category it
/// is promoted to best, regardless of raw score rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPreference {
    /// Rows from ticket-handling tabs
    Ticket,
    /// Rows whose tab name contains the given text (case-insensitive)
    Tab(String),
}

impl CategoryPreference {
    pub fn matches(&self, tab: &str) -> bool {
        let tab = tab.to_lowercase();
        match self {
            Self::Ticket => tab.contains("ticket"),
            Self::Tab(name) => {
                let name = name.trim().to_lowercase();
                !name.is_empty() && tab.contains(&name)
            },
        }
    }
}

/// Per-request search options
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Result limit; the retriever's configured default when `None`
    pub top_k: Option<usize>,
    pub prefer: Option<CategoryPreference>,
}

impl SearchOptions {
    pub fn with_top_k(top_k: usize) -> Self {
        Self {
            top_k: Some(top_k),
            ..Default::default()
        }
    }

    pub fn preferring(mut self, preference: CategoryPreference) -> Self {
        self.prefer = Some(preference);
        self
    }
}

/// A row together with its score for one query
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub row: Arc<KnowledgeRow>,
    pub score: f32,
}

/// Flat, render-ready view of a scored row
///
/// Routing fields always carry a value; blanks become the `not specified`
/// sentinel so renderers never branch on absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub tab: String,
    pub row: u32,
    pub score: f32,
    pub description: String,
    pub instructions: String,
    pub slack: String,
    pub refund_queue: String,
    pub ticket: String,
    pub supervisor: String,
}

impl SearchHit {
    pub fn from_row(row: &KnowledgeRow, score: f32) -> Self {
        let Routing {
            slack,
            refund_queue,
            ticket,
            supervisor,
        } = row.routing.or_not_specified();

        Self {
            id: row.id.clone(),
            tab: row.tab.clone(),
            row: row.row_number,
            score,
            description: row.description.clone(),
            instructions: row.instructions.clone(),
            slack,
            refund_queue,
            ticket,
            supervisor,
        }
    }
}

impl From<&ScoredRow> for SearchHit {
    fn from(scored: &ScoredRow) -> Self {
        SearchHit::from_row(&scored.row, scored.score)
    }
}

/// Result of `Retriever::search`
///
/// `hits` is always present, sorted by non-increasing score and never longer
/// than the requested top-k.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

impl SearchResponse {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            hits: Vec::new(),
        }
    }

    pub fn top_score(&self) -> f32 {
        self.hits.first().map(|h| h.score).unwrap_or(0.0)
    }
}

/// The accepted best match for a request
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub matched_row: Arc<KnowledgeRow>,
    pub score: f32,
    /// Steps split from the matched row's instructions
    pub extracted_steps: Vec<String>,
    /// Ranked candidates, descending by score
    pub top_k: Vec<ScoredRow>,
    /// True when a category preference overrode the raw score order
    pub preferred: bool,
}

/// Outcome of asking for the single best row
///
/// `NotCovered` is a normal answer, not an error: the scenario simply is not
/// documented well enough to match with confidence.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    Matched(QueryResult),
    NotCovered {
        /// Best raw score seen, 0 when nothing matched at all
        top_score: f32,
        /// Number of rows that scored above zero
        matched_count: usize,
    },
}

impl MatchOutcome {
    pub fn is_covered(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn top_score(&self) -> f32 {
        match self {
            Self::Matched(result) => result.top_k.first().map(|s| s.score).unwrap_or(result.score),
            Self::NotCovered { top_score, .. } => *top_score,
        }
    }
}

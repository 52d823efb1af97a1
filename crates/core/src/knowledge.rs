//! Knowledge base rows
//!
//! A `KnowledgeRow` is one documented issue-and-procedure pairing from the
//! compliance matrix. Rows are built once by the loader and never mutated
//! afterwards; consumers share them behind `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentinel shown for routing fields the source left blank
pub const NOT_SPECIFIED: &str = "not specified";

/// Tab name used when a row carries no tab/sheet
pub const UNKNOWN_TAB: &str = "Unknown";

/// Routing flags attached to a row
///
/// Values are kept exactly as written in the source (commonly "Yes"/"No" or a
/// short note). Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    pub slack: String,
    pub refund_queue: String,
    pub ticket: String,
    pub supervisor: String,
}

impl Routing {
    /// Copy with blank fields replaced by [`NOT_SPECIFIED`]
    pub fn or_not_specified(&self) -> Routing {
        Routing {
            slack: or_sentinel(&self.slack),
            refund_queue: or_sentinel(&self.refund_queue),
            ticket: or_sentinel(&self.ticket),
            supervisor: or_sentinel(&self.supervisor),
        }
    }

    /// All routing values, in display order
    pub fn values(&self) -> [&str; 4] {
        [
            self.slack.as_str(),
            self.refund_queue.as_str(),
            self.ticket.as_str(),
            self.supervisor.as_str(),
        ]
    }
}

fn or_sentinel(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        value.to_string()
    }
}

/// One normalized knowledge base row
#[derive(Debug, Clone, Default)]
pub struct KnowledgeRow {
    /// Stable identifier (explicit, or `<tab-slug>-<row>`)
    pub id: String,
    /// Originating tab/sheet
    pub tab: String,
    /// 1-based position within the source tab, used for citation
    pub row_number: u32,
    /// Issue / scenario text identifying the situation
    pub description: String,
    /// What the caller typically says
    pub guest_says: String,
    /// Short "what to do" guidance column
    pub summary: String,
    /// Free-text procedure, may embed numbered steps
    pub instructions: String,
    pub routing: Routing,
    /// Curated keyword phrases supplied by the source
    pub keywords: Vec<String>,
    /// Every normalized token of the row's text (no stopword filtering)
    pub search_tokens: HashSet<String>,
    /// Normalized tokens of the curated keywords
    pub keyword_tokens: HashSet<String>,
}

impl KnowledgeRow {
    /// Human-readable citation, e.g. `Voice Matrix → Row 12`
    pub fn citation(&self) -> String {
        format!("{} → Row {}", self.tab, self.row_number)
    }

    /// All searchable text of the row, space-joined
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.tab.as_str(),
            self.description.as_str(),
            self.guest_says.as_str(),
            self.summary.as_str(),
            self.instructions.as_str(),
        ];
        parts.extend(self.routing.values());
        parts.extend(self.keywords.iter().map(String::as_str));
        parts.retain(|p| !p.trim().is_empty());
        parts.join(" ")
    }

    /// Rows without tokens can never score
    pub fn is_searchable(&self) -> bool {
        !self.search_tokens.is_empty()
    }
}

//! Search vocabulary
//!
//! Hand-authored word lists that bridge caller phrasing and matrix phrasing:
//! query stopwords, ordered phrase synonyms, trigger-based expansion rules
//! and the high-value boost phrases. Built-in defaults cover the compliance
//! matrix; a YAML or JSON file can replace any individual list.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Replace every occurrence of `from` with `to` in the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSynonym {
    pub from: String,
    pub to: String,
}

/// Append `add` terms when any trigger phrase occurs in the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionRule {
    pub triggers: Vec<String>,
    pub add: Vec<String>,
}

/// Word lists used by the query expander and scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Removed from query tokens only, never from indexed rows
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,

    /// Applied in order; earlier substitutions feed later ones
    #[serde(default = "default_phrase_synonyms")]
    pub phrase_synonyms: Vec<PhraseSynonym>,

    #[serde(default = "default_expansion_rules")]
    pub expansion_rules: Vec<ExpansionRule>,

    /// Phrases worth a large bonus when both query and row contain them
    #[serde(default = "default_boost_phrases")]
    pub boost_phrases: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            stopwords: default_stopwords(),
            phrase_synonyms: default_phrase_synonyms(),
            expansion_rules: default_expansion_rules(),
            boost_phrases: default_boost_phrases(),
        }
    }
}

impl VocabularyConfig {
    /// Load a vocabulary file (`.yaml`, `.yml` or `.json`)
    ///
    /// Lists missing from the file keep their built-in defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let vocabulary: VocabularyConfig = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?,
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "search.vocabulary_path".to_string(),
                    message: format!("Unsupported vocabulary file type: {}", path.display()),
                })
            },
        };

        tracing::info!(
            path = %path.display(),
            stopwords = vocabulary.stopwords.len(),
            synonyms = vocabulary.phrase_synonyms.len(),
            rules = vocabulary.expansion_rules.len(),
            boost_phrases = vocabulary.boost_phrases.len(),
            "Loaded search vocabulary"
        );

        Ok(vocabulary)
    }

    /// Built-in vocabulary, or the file at `path` when one is configured
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Self::load(Path::new(p)),
            None => Ok(Self::default()),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_stopwords() -> Vec<String> {
    strings(&[
        "a", "an", "the", "and", "or", "to", "of", "in", "on", "for", "with", "at", "by", "from",
        "is", "are", "be", "been", "being", "it", "this", "that", "as", "can", "could", "should",
        "would", "will", "just", "please", "help", "need", "want",
        // domain-generic nouns that appear in nearly every row
        "hotel", "issue", "issues", "request", "requests", "guest", "customer", "client",
        "booking", "bookings", "stay", "date", "dates", "night", "nights",
    ])
}

fn default_phrase_synonyms() -> Vec<PhraseSynonym> {
    [
        ("hotel sold out", "sold out"),
        ("no availability", "sold out"),
        ("fully booked", "sold out"),
        ("no rooms", "sold out"),
        ("no room", "sold out"),
        ("money back", "refund"),
        ("reimbursement", "refund"),
        ("reimburse", "refund"),
        ("change dates", "modify dates"),
        ("change date", "modify dates"),
        ("move my reservation", "modify reservation"),
        ("change my reservation", "modify reservation"),
    ]
    .iter()
    .map(|(from, to)| PhraseSynonym {
        from: from.to_string(),
        to: to.to_string(),
    })
    .collect()
}

fn default_expansion_rules() -> Vec<ExpansionRule> {
    // "Sold out" is not a matrix scenario; the closest documented procedure
    // is "Reservation not found at check-in".
    vec![ExpansionRule {
        triggers: strings(&["sold out", "fully booked", "no availability", "no rooms", "no room"]),
        add: strings(&[
            "reservation not found",
            "check-in",
            "supplier",
            "unconfirmed",
            "voucher",
            "rebook",
            "relocate",
            "inventory",
        ]),
    }]
}

fn default_boost_phrases() -> Vec<String> {
    strings(&[
        "reservation not found",
        "can t check in",
        "cant check in",
        "cannot check in",
        "hotel cannot find",
        "room not found",
        "check in issue",
        "unconfirmed",
    ])
}

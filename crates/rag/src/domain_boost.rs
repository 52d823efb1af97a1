//! Domain phrase boosting
//!
//! A handful of phrases identify the highest-traffic matrix scenarios
//! ("reservation not found", "can't check in"). When such a phrase appears in
//! both the expanded query and a row, the row gets a flat bonus per phrase.
//! The phrase list is config-driven via [`VocabularyConfig::boost_phrases`].

use compliance_assist_config::constants::scoring;
use compliance_assist_config::VocabularyConfig;

use crate::query_expansion::ExpandedQuery;
use crate::text::{contains_phrase, normalize};

/// Domain booster configuration
#[derive(Debug, Clone)]
pub struct DomainBoostConfig {
    /// Bonus added once per phrase present in both query and row
    pub phrase_bonus: f32,
}

impl Default for DomainBoostConfig {
    fn default() -> Self {
        Self {
            phrase_bonus: scoring::DOMAIN_PHRASE,
        }
    }
}

/// Boost computed for one query/row pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoostResult {
    /// Phrases present in both the query and the row
    pub matched_phrases: Vec<String>,
    pub total_boost: f32,
}

/// Adds a flat bonus for high-value phrases shared by query and row
#[derive(Debug, Clone)]
pub struct DomainBooster {
    config: DomainBoostConfig,
    phrases: Vec<String>,
}

impl DomainBooster {
    pub fn new(config: DomainBoostConfig, phrases: &[String]) -> Self {
        let mut normalized: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = normalize(phrase);
            if !phrase.is_empty() && !normalized.contains(&phrase) {
                normalized.push(phrase);
            }
        }

        Self {
            config,
            phrases: normalized,
        }
    }

    pub fn from_vocabulary(vocabulary: &VocabularyConfig) -> Self {
        Self::new(DomainBoostConfig::default(), &vocabulary.boost_phrases)
    }

    /// Phrases present in the expanded query text
    ///
    /// Computed once per query; rows are then checked against this subset.
    pub fn query_phrases<'a>(&'a self, query: &ExpandedQuery) -> Vec<&'a str> {
        self.phrases
            .iter()
            .filter(|phrase| contains_phrase(&query.text, phrase))
            .map(String::as_str)
            .collect()
    }

    /// Boost for a row given the query's matching phrases
    ///
    /// `row_text` must already be normalized.
    pub fn boost(&self, query_phrases: &[&str], row_text: &str) -> BoostResult {
        let matched_phrases: Vec<String> = query_phrases
            .iter()
            .filter(|phrase| contains_phrase(row_text, phrase))
            .map(|phrase| phrase.to_string())
            .collect();

        let total_boost = matched_phrases.len() as f32 * self.config.phrase_bonus;

        BoostResult {
            matched_phrases,
            total_boost,
        }
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_expansion::{QueryExpander, QueryExpansionConfig};

    fn expand(query: &str) -> ExpandedQuery {
        QueryExpander::from_vocabulary(&VocabularyConfig::default(), QueryExpansionConfig::default())
            .expand(query)
    }

    #[test]
    fn test_default_phrases_normalized() {
        let booster = DomainBooster::from_vocabulary(&VocabularyConfig::default());
        assert_eq!(booster.phrase_count(), 8);
    }

    #[test]
    fn test_boost_requires_both_sides() {
        let booster = DomainBooster::from_vocabulary(&VocabularyConfig::default());
        let query = expand("I can't check in");
        let phrases = booster.query_phrases(&query);
        assert_eq!(phrases, vec!["can t check in"]);

        let hit = booster.boost(&phrases, "guest says they can t check in at the front desk");
        assert_eq!(hit.matched_phrases, vec!["can t check in".to_string()]);
        assert_eq!(hit.total_boost, scoring::DOMAIN_PHRASE);

        let miss = booster.boost(&phrases, "refund for early departure");
        assert!(miss.matched_phrases.is_empty());
        assert_eq!(miss.total_boost, 0.0);
    }

    #[test]
    fn test_injected_terms_reach_booster() {
        let booster = DomainBooster::from_vocabulary(&VocabularyConfig::default());
        let query = expand("hotel sold out");
        let phrases = booster.query_phrases(&query);

        assert!(phrases.contains(&"reservation not found"));
        assert!(phrases.contains(&"unconfirmed"));

        let boost = booster.boost(&phrases, "reservation not found at check in unconfirmed booking");
        assert_eq!(boost.total_boost, 2.0 * scoring::DOMAIN_PHRASE);
    }

    #[test]
    fn test_custom_bonus() {
        let booster = DomainBooster::new(
            DomainBoostConfig { phrase_bonus: 5.0 },
            &["Lost Key".to_string(), "lost key".to_string()],
        );
        assert_eq!(booster.phrase_count(), 1);
        let query = expand("lost key");
        let phrases = booster.query_phrases(&query);
        assert_eq!(booster.boost(&phrases, "lost key card").total_boost, 5.0);
    }
}

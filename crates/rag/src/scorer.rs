//! Additive row scoring
//!
//! Every component is a plain sum so a reviewer can explain a ranking by
//! hand: per-token weights for each field a token appears in, a bonus when
//! the whole query appears inside the description or "guest says" text,
//! and a flat domain-phrase bonus.

use std::collections::HashSet;
use std::sync::Arc;

use compliance_assist_config::constants::{scoring, search};
use compliance_assist_core::KnowledgeRow;
use serde::Serialize;

use crate::domain_boost::DomainBooster;
use crate::query_expansion::ExpandedQuery;
use crate::text::{contains_phrase, normalize};

/// Scoring weights
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub blob_token: f32,
    pub description_token: f32,
    pub guest_says_token: f32,
    pub summary_token: f32,
    pub keyword_token: f32,
    pub description_phrase: f32,
    pub guest_says_phrase: f32,
    /// Normalized queries shorter than this never earn phrase bonuses
    pub min_phrase_chars: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            blob_token: scoring::BLOB_TOKEN,
            description_token: scoring::DESCRIPTION_TOKEN,
            guest_says_token: scoring::GUEST_SAYS_TOKEN,
            summary_token: scoring::SUMMARY_TOKEN,
            keyword_token: scoring::KEYWORD_TOKEN,
            description_phrase: scoring::DESCRIPTION_PHRASE,
            guest_says_phrase: scoring::GUEST_SAYS_PHRASE,
            min_phrase_chars: search::MIN_PHRASE_BOOST_CHARS,
        }
    }
}

/// Normalized text of one field plus its token set
#[derive(Debug, Clone, Default)]
struct FieldIndex {
    text: String,
    tokens: HashSet<String>,
}

impl FieldIndex {
    fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let tokens = text.split_whitespace().map(str::to_string).collect();
        Self { text, tokens }
    }
}

/// A knowledge row with its per-field match structures precomputed
#[derive(Debug, Clone)]
pub struct IndexedRow {
    pub row: Arc<KnowledgeRow>,
    description: FieldIndex,
    guest_says: FieldIndex,
    summary: FieldIndex,
    /// Normalized text of the whole row
    blob: String,
}

impl IndexedRow {
    pub fn new(row: KnowledgeRow) -> Self {
        Self::from_shared(Arc::new(row))
    }

    pub fn from_shared(row: Arc<KnowledgeRow>) -> Self {
        Self {
            description: FieldIndex::new(&row.description),
            guest_says: FieldIndex::new(&row.guest_says),
            summary: FieldIndex::new(&row.summary),
            blob: normalize(&row.searchable_text()),
            row,
        }
    }
}

/// Per-component score for one row, for explainability
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub blob: f32,
    pub description: f32,
    pub guest_says: f32,
    pub summary: f32,
    pub keywords: f32,
    pub phrase: f32,
    pub domain: f32,
    /// Query tokens found anywhere in the row
    pub matched_tokens: Vec<String>,
    /// Domain phrases shared by query and row
    pub matched_phrases: Vec<String>,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f32 {
        self.blob
            + self.description
            + self.guest_says
            + self.summary
            + self.keywords
            + self.phrase
            + self.domain
    }
}

/// Scores rows against an expanded query
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    booster: DomainBooster,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, booster: DomainBooster) -> Self {
        Self { weights, booster }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Prepare per-query state shared by every row
    pub fn prepare<'a>(&'a self, query: &'a ExpandedQuery) -> PreparedQuery<'a> {
        let (phrase_forms, short_forms): (Vec<&str>, Vec<&str>) = query
            .phrase_forms()
            .into_iter()
            .filter(|form| !form.is_empty())
            .partition(|form| form.chars().count() >= self.weights.min_phrase_chars);

        // Short all-stopword queries can only match a field equal to them
        let exact_forms = if query.tokens.is_empty() {
            short_forms
        } else {
            Vec::new()
        };

        PreparedQuery {
            query,
            phrase_forms,
            exact_forms,
            domain_phrases: self.booster.query_phrases(query),
        }
    }

    /// Total score of `row`, 0 when nothing matches
    pub fn score(&self, prepared: &PreparedQuery<'_>, row: &IndexedRow) -> f32 {
        self.explain(prepared, row).total()
    }

    /// Score components of `row`
    pub fn explain(&self, prepared: &PreparedQuery<'_>, row: &IndexedRow) -> ScoreBreakdown {
        let w = &self.weights;
        let mut breakdown = ScoreBreakdown::default();

        for token in &prepared.query.tokens {
            if !row.row.search_tokens.contains(token) {
                continue;
            }
            breakdown.blob += w.blob_token;
            breakdown.matched_tokens.push(token.clone());

            if row.description.tokens.contains(token) {
                breakdown.description += w.description_token;
            }
            if row.guest_says.tokens.contains(token) {
                breakdown.guest_says += w.guest_says_token;
            }
            if row.summary.tokens.contains(token) {
                breakdown.summary += w.summary_token;
            }
            if row.row.keyword_tokens.contains(token) {
                breakdown.keywords += w.keyword_token;
            }
        }

        if prepared.matches_field(&row.description.text) {
            breakdown.phrase += w.description_phrase;
        }
        if prepared.matches_field(&row.guest_says.text) {
            breakdown.phrase += w.guest_says_phrase;
        }

        let boost = self.booster.boost(&prepared.domain_phrases, &row.blob);
        breakdown.domain = boost.total_boost;
        breakdown.matched_phrases = boost.matched_phrases;

        breakdown
    }
}

/// Query-level state computed once per search
#[derive(Debug)]
pub struct PreparedQuery<'a> {
    pub query: &'a ExpandedQuery,
    phrase_forms: Vec<&'a str>,
    exact_forms: Vec<&'a str>,
    domain_phrases: Vec<&'a str>,
}

impl PreparedQuery<'_> {
    /// Whole-query match against one normalized field
    fn matches_field(&self, field: &str) -> bool {
        self.phrase_forms
            .iter()
            .any(|form| contains_phrase(field, form))
            || self.exact_forms.iter().any(|form| *form == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_expansion::{QueryExpander, QueryExpansionConfig};
    use compliance_assist_config::VocabularyConfig;

    fn fixture() -> (QueryExpander, Scorer) {
        let vocabulary = VocabularyConfig::default();
        (
            QueryExpander::from_vocabulary(&vocabulary, QueryExpansionConfig::default()),
            Scorer::new(
                ScoringWeights::default(),
                DomainBooster::from_vocabulary(&vocabulary),
            ),
        )
    }

    fn indexed(description: &str, guest_says: &str, instructions: &str) -> IndexedRow {
        let mut row = KnowledgeRow {
            tab: "Voice".to_string(),
            description: description.to_string(),
            guest_says: guest_says.to_string(),
            instructions: instructions.to_string(),
            ..Default::default()
        };
        row.search_tokens = normalize(&row.searchable_text())
            .split_whitespace()
            .map(str::to_string)
            .collect();
        IndexedRow::new(row)
    }

    #[test]
    fn test_description_token_weight() {
        let (expander, scorer) = fixture();
        let row = indexed("Pet fee dispute", "", "");
        let query = expander.expand("fee");
        let prepared = scorer.prepare(&query);

        let breakdown = scorer.explain(&prepared, &row);
        assert_eq!(breakdown.blob, scoring::BLOB_TOKEN);
        assert_eq!(breakdown.description, scoring::DESCRIPTION_TOKEN);
        assert_eq!(breakdown.phrase, 0.0);
        assert_eq!(breakdown.matched_tokens, vec!["fee".to_string()]);
        assert_eq!(scorer.score(&prepared, &row), 8.0);
    }

    #[test]
    fn test_instructions_only_match_scores_blob() {
        let (expander, scorer) = fixture();
        let row = indexed("Late arrival", "", "Call the supplier to hold the room");
        let query = expander.expand("supplier");
        let prepared = scorer.prepare(&query);
        assert_eq!(scorer.score(&prepared, &row), scoring::BLOB_TOKEN);
    }

    #[test]
    fn test_phrase_bonus_requires_min_length() {
        let (expander, scorer) = fixture();
        let row = indexed("Pet fee dispute", "pet fee", "");

        let short = expander.expand("pet");
        let prepared = scorer.prepare(&short);
        assert_eq!(scorer.explain(&prepared, &row).phrase, 0.0);

        let long = expander.expand("pet fee dispute");
        let prepared = scorer.prepare(&long);
        assert_eq!(
            scorer.explain(&prepared, &row).phrase,
            scoring::DESCRIPTION_PHRASE
        );
    }

    #[test]
    fn test_phrase_bonus_both_fields() {
        let (expander, scorer) = fixture();
        let row = indexed("Early check out", "I want early check out", "");
        let query = expander.expand("early check out");
        let prepared = scorer.prepare(&query);
        assert_eq!(
            scorer.explain(&prepared, &row).phrase,
            scoring::DESCRIPTION_PHRASE + scoring::GUEST_SAYS_PHRASE
        );
    }

    #[test]
    fn test_domain_bonus() {
        let (expander, scorer) = fixture();
        let row = indexed("Reservation not found at check-in", "", "");
        let query = expander.expand("hotel sold out");
        let prepared = scorer.prepare(&query);

        let breakdown = scorer.explain(&prepared, &row);
        assert_eq!(breakdown.domain, scoring::DOMAIN_PHRASE);
        assert_eq!(breakdown.matched_phrases, vec!["reservation not found".to_string()]);
        assert!(breakdown.description > 0.0);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let (expander, scorer) = fixture();
        let row = indexed("Parking fees", "", "Refer to hotel policy");
        let query = expander.expand("pool towels");
        let prepared = scorer.prepare(&query);
        assert_eq!(scorer.score(&prepared, &row), 0.0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let (expander, scorer) = fixture();
        let row = indexed("Refund", "refund", "refund");
        let query = expander.expand("the a an");
        let prepared = scorer.prepare(&query);
        assert_eq!(scorer.score(&prepared, &row), 0.0);
    }

    #[test]
    fn test_stopword_description_matches_itself() {
        let (expander, scorer) = fixture();
        let row = indexed("Booking dates", "", "1. Verify the reservation. 2. Call supplier.");
        let query = expander.expand("Booking dates");
        assert!(query.tokens.is_empty());

        let prepared = scorer.prepare(&query);
        assert_eq!(
            scorer.explain(&prepared, &row).phrase,
            scoring::DESCRIPTION_PHRASE
        );
    }

    #[test]
    fn test_short_stopword_query_needs_exact_field() {
        let (expander, scorer) = fixture();
        let query = expander.expand("Stay");
        let prepared = scorer.prepare(&query);

        assert_eq!(scorer.score(&prepared, &indexed("Stay", "", "")), scoring::DESCRIPTION_PHRASE);
        assert_eq!(scorer.score(&prepared, &indexed("Extend stay", "", "")), 0.0);
    }
}

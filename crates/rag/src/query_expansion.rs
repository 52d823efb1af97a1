//! Query expansion for matrix retrieval
//!
//! Bridges caller phrasing and matrix phrasing in two passes:
//! - Ordered phrase substitution ("fully booked" -> "sold out")
//! - Trigger rules that append closely related matrix terms
//!
//! The word lists come from [`VocabularyConfig`]; nothing here is hardcoded.

use std::collections::HashSet;

use compliance_assist_config::constants::search;
use compliance_assist_config::VocabularyConfig;

use crate::text::{contains_phrase, normalize};

/// Query expansion configuration
#[derive(Debug, Clone)]
pub struct QueryExpansionConfig {
    /// Query tokens shorter than this (in chars) are dropped
    pub min_token_len: usize,
}

impl Default for QueryExpansionConfig {
    fn default() -> Self {
        Self {
            min_token_len: search::MIN_QUERY_TOKEN_LEN,
        }
    }
}

/// Expanded query result
#[derive(Debug, Clone, Default)]
pub struct ExpandedQuery {
    /// Normalized form of the caller's text
    pub original: String,
    /// `original` after phrase substitutions
    pub substituted: String,
    /// Normalized terms appended by trigger rules, in rule order
    pub injected: Vec<String>,
    /// `substituted` followed by every injected term
    pub text: String,
    /// Deduplicated query tokens, stopwords and short tokens removed
    pub tokens: Vec<String>,
    pub was_expanded: bool,
    pub stats: ExpansionStats,
}

impl ExpandedQuery {
    /// Distinct normalized whole-query forms, for phrase containment
    pub fn phrase_forms(&self) -> Vec<&str> {
        let mut forms = vec![self.original.as_str()];
        if self.substituted != self.original {
            forms.push(self.substituted.as_str());
        }
        forms
    }
}

/// Expansion statistics
#[derive(Debug, Clone, Default)]
pub struct ExpansionStats {
    /// Synonym substitutions that changed the query
    pub substitutions: usize,
    /// Trigger rules that fired
    pub rules_fired: usize,
    /// Terms appended by rules, after dedup
    pub injected_terms: usize,
    /// Tokens removed as stopwords or too short
    pub filtered_tokens: usize,
}

/// Normalized phrase substitution
#[derive(Debug, Clone)]
struct Substitution {
    from: Vec<String>,
    to: Vec<String>,
}

/// Normalized trigger rule
#[derive(Debug, Clone)]
struct TriggerRule {
    triggers: Vec<String>,
    add: Vec<String>,
}

/// Query expander for matrix retrieval
#[derive(Debug, Clone)]
pub struct QueryExpander {
    config: QueryExpansionConfig,
    substitutions: Vec<Substitution>,
    rules: Vec<TriggerRule>,
    stopwords: HashSet<String>,
}

impl QueryExpander {
    /// Create an expander with no vocabulary
    ///
    /// Only normalization and token filtering by length apply.
    pub fn new(config: QueryExpansionConfig) -> Self {
        Self {
            config,
            substitutions: Vec::new(),
            rules: Vec::new(),
            stopwords: HashSet::new(),
        }
    }

    /// Create from the configured vocabulary
    ///
    /// Every list entry is normalized once here so matching later works on
    /// plain token equality.
    pub fn from_vocabulary(vocabulary: &VocabularyConfig, config: QueryExpansionConfig) -> Self {
        let substitutions = vocabulary
            .phrase_synonyms
            .iter()
            .filter_map(|synonym| {
                let from = split_tokens(&synonym.from);
                if from.is_empty() {
                    return None;
                }
                Some(Substitution {
                    from,
                    to: split_tokens(&synonym.to),
                })
            })
            .collect();

        let rules = vocabulary
            .expansion_rules
            .iter()
            .map(|rule| TriggerRule {
                triggers: normalized_list(&rule.triggers),
                add: normalized_list(&rule.add),
            })
            .filter(|rule| !rule.triggers.is_empty() && !rule.add.is_empty())
            .collect();

        let stopwords = vocabulary
            .stopwords
            .iter()
            .map(|w| normalize(w))
            .filter(|w| !w.is_empty())
            .collect();

        Self {
            config,
            substitutions,
            rules,
            stopwords,
        }
    }

    /// Expand a raw caller question
    pub fn expand(&self, query: &str) -> ExpandedQuery {
        let original = normalize(query);
        let mut stats = ExpansionStats::default();

        let mut tokens: Vec<String> = original.split_whitespace().map(str::to_string).collect();
        for substitution in &self.substitutions {
            let (replaced, count) = replace_phrase(&tokens, &substitution.from, &substitution.to);
            if count > 0 {
                stats.substitutions += count;
                tokens = replaced;
            }
        }
        let substituted = tokens.join(" ");

        let mut injected: Vec<String> = Vec::new();
        for rule in &self.rules {
            let fired = rule
                .triggers
                .iter()
                .any(|trigger| contains_phrase(&substituted, trigger));
            if !fired {
                continue;
            }
            stats.rules_fired += 1;
            for term in &rule.add {
                if !injected.contains(term) {
                    injected.push(term.clone());
                }
            }
        }
        stats.injected_terms = injected.len();

        let text = if injected.is_empty() {
            substituted.clone()
        } else if substituted.is_empty() {
            injected.join(" ")
        } else {
            format!("{} {}", substituted, injected.join(" "))
        };

        let query_tokens = self.query_tokens(&text, &mut stats);
        let was_expanded = stats.substitutions > 0 || !injected.is_empty();

        ExpandedQuery {
            original,
            substituted,
            injected,
            text,
            tokens: query_tokens,
            was_expanded,
            stats,
        }
    }

    /// Check if a normalized word is a stopword
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    fn query_tokens(&self, text: &str, stats: &mut ExpansionStats) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();

        for token in text.split_whitespace() {
            if token.chars().count() < self.config.min_token_len || self.is_stopword(token) {
                stats.filtered_tokens += 1;
                continue;
            }
            if seen.insert(token) {
                tokens.push(token.to_string());
            }
        }

        tokens
    }
}

fn split_tokens(phrase: &str) -> Vec<String> {
    normalize(phrase)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn normalized_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let normalized = normalize(item);
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

/// Replace every whole-token occurrence of `from` with `to`
///
/// Replacement output is not rescanned, so a synonym whose target contains
/// its source cannot loop.
fn replace_phrase(tokens: &[String], from: &[String], to: &[String]) -> (Vec<String>, usize) {
    let mut out = Vec::with_capacity(tokens.len());
    let mut count = 0;
    let mut i = 0;

    while i < tokens.len() {
        if tokens.len() - i >= from.len() && tokens[i..i + from.len()] == *from {
            out.extend(to.iter().cloned());
            i += from.len();
            count += 1;
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }

    (out, count)
}

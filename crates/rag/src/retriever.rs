//! Matrix retriever
//!
//! Full-scan lexical ranking over the in-memory knowledge rows. The index is
//! built once and never mutated; reloading builds a fresh retriever.

use std::path::Path;
use std::sync::Arc;

use compliance_assist_config::constants::search;
use compliance_assist_config::{SearchConfig, Settings, VocabularyConfig};
use compliance_assist_core::{
    KnowledgeRow, MatchOutcome, QueryResult, Retriever, ScoredRow, SearchHit, SearchOptions,
    SearchResponse,
};

use crate::domain_boost::DomainBooster;
use crate::knowledge_loader::KnowledgeLoader;
use crate::query_expansion::{ExpandedQuery, QueryExpander, QueryExpansionConfig};
use crate::scorer::{IndexedRow, ScoreBreakdown, Scorer, ScoringWeights};
use crate::steps::split_steps;
use crate::RagError;

/// Retriever configuration
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Hits returned when the caller does not ask for a count
    pub top_k: usize,
    /// Largest top-k a caller may request
    pub max_top_k: usize,
    /// Acceptance threshold on the additive score
    pub min_score: f32,
    pub min_query_token_len: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: search::DEFAULT_TOP_K,
            max_top_k: search::MAX_TOP_K,
            min_score: search::MIN_ACCEPT_SCORE,
            min_query_token_len: search::MIN_QUERY_TOKEN_LEN,
        }
    }
}

impl From<&SearchConfig> for RetrieverConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            top_k: config.top_k,
            max_top_k: config.max_top_k,
            min_score: config.min_score,
            min_query_token_len: config.min_query_token_len,
        }
    }
}

impl RetrieverConfig {
    /// Clamp a requested count to `1..=max_top_k`
    pub fn effective_top_k(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.top_k)
            .clamp(1, self.max_top_k.max(1))
    }
}

/// A ranked row with its score components
#[derive(Debug, Clone)]
pub struct ExplainedHit {
    pub scored: ScoredRow,
    pub breakdown: ScoreBreakdown,
}

/// Lexical retriever over the compliance matrix
#[derive(Debug)]
pub struct MatrixRetriever {
    config: RetrieverConfig,
    expander: QueryExpander,
    scorer: Scorer,
    rows: Vec<IndexedRow>,
}

impl MatrixRetriever {
    /// Build a retriever over already-loaded rows
    pub fn new(rows: Vec<KnowledgeRow>, vocabulary: &VocabularyConfig, config: RetrieverConfig) -> Self {
        let expander = QueryExpander::from_vocabulary(
            vocabulary,
            QueryExpansionConfig {
                min_token_len: config.min_query_token_len,
            },
        );
        let scorer = Scorer::new(
            ScoringWeights::default(),
            DomainBooster::from_vocabulary(vocabulary),
        );
        let rows = rows.into_iter().map(IndexedRow::new).collect();

        Self {
            config,
            expander,
            scorer,
            rows,
        }
    }

    /// Load the knowledge file and vocabulary named in `settings`
    ///
    /// Fails when the path is blank, the file is missing or unparsable, or
    /// the file holds no rows and `knowledge.allow_empty` is off.
    pub fn from_settings(settings: &Settings) -> Result<Self, RagError> {
        let path = settings.knowledge.path.trim();
        if path.is_empty() {
            return Err(RagError::Config(
                "knowledge.path is required to build the retriever".to_string(),
            ));
        }

        let vocabulary = VocabularyConfig::load_or_default(settings.search.vocabulary_path.as_deref())
            .map_err(|e| RagError::Config(e.to_string()))?;

        let rows = KnowledgeLoader::load_file(Path::new(path))?;
        if rows.is_empty() && !settings.knowledge.allow_empty {
            return Err(RagError::EmptyKnowledgeBase(path.to_string()));
        }

        let retriever = Self::new(rows, &vocabulary, RetrieverConfig::from(&settings.search));

        tracing::info!(
            path = %path,
            rows = retriever.rows.len(),
            min_score = retriever.config.min_score,
            "Matrix retriever ready"
        );

        Ok(retriever)
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Expand a question the way `rank` does
    pub fn expand(&self, question: &str) -> ExpandedQuery {
        self.expander.expand(question)
    }

    /// Rank rows for a question, descending by score
    ///
    /// Only rows scoring above zero are returned. Ties keep load order.
    pub fn rank(&self, question: &str, top_k: Option<usize>) -> Vec<ScoredRow> {
        self.explain(question, top_k)
            .into_iter()
            .map(|hit| hit.scored)
            .collect()
    }

    /// Like [`rank`](Self::rank), keeping each row's score components
    pub fn explain(&self, question: &str, top_k: Option<usize>) -> Vec<ExplainedHit> {
        let top_k = self.config.effective_top_k(top_k);
        let query = self.expander.expand(question);

        if query.text.is_empty() {
            tracing::debug!("Empty query");
            return Vec::new();
        }
        if query.tokens.is_empty() {
            tracing::debug!(query = %query.original, "No usable query tokens, whole-phrase match only");
        }

        let prepared = self.scorer.prepare(&query);
        let mut hits: Vec<ExplainedHit> = self
            .rows
            .iter()
            .filter_map(|row| {
                let breakdown = self.scorer.explain(&prepared, row);
                let score = breakdown.total();
                (score > 0.0).then(|| ExplainedHit {
                    scored: ScoredRow {
                        row: Arc::clone(&row.row),
                        score,
                    },
                    breakdown,
                })
            })
            .collect();

        // Stable: equal scores keep load order
        hits.sort_by(|a, b| b.scored.score.total_cmp(&a.scored.score));

        tracing::debug!(
            query = %query.original,
            expanded = %query.text,
            tokens = query.tokens.len(),
            matched = hits.len(),
            top_score = hits.first().map(|h| h.scored.score).unwrap_or(0.0),
            "Ranked matrix rows"
        );

        hits.truncate(top_k);
        hits
    }
}

impl Retriever for MatrixRetriever {
    fn search(&self, question: &str, options: &SearchOptions) -> SearchResponse {
        let hits = self
            .rank(question, options.top_k)
            .iter()
            .map(SearchHit::from)
            .collect();

        SearchResponse {
            query: question.to_string(),
            hits,
        }
    }

    fn accept_best(&self, question: &str, options: &SearchOptions) -> MatchOutcome {
        let ranked = self.rank(question, options.top_k);
        let top_score = ranked.first().map(|s| s.score).unwrap_or(0.0);

        let candidates: Vec<usize> = ranked
            .iter()
            .enumerate()
            .filter(|(_, s)| s.score >= self.config.min_score)
            .map(|(i, _)| i)
            .collect();

        let Some(&first) = candidates.first() else {
            tracing::debug!(top_score, matched = ranked.len(), "No confident match");
            return MatchOutcome::NotCovered {
                top_score,
                matched_count: ranked.len(),
            };
        };

        let chosen = options
            .prefer
            .as_ref()
            .and_then(|pref| {
                candidates
                    .iter()
                    .copied()
                    .find(|&i| pref.matches(&ranked[i].row.tab))
            })
            .unwrap_or(first);

        let best = &ranked[chosen];
        let extracted_steps = split_steps(&best.row.instructions);

        tracing::debug!(
            row = %best.row.id,
            score = best.score,
            preferred = chosen != first,
            steps = extracted_steps.len(),
            "Accepted matrix row"
        );

        MatchOutcome::Matched(QueryResult {
            matched_row: Arc::clone(&best.row),
            score: best.score,
            extracted_steps,
            preferred: chosen != first,
            top_k: ranked,
        })
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

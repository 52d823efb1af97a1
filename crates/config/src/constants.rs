//! Centralized constants for the compliance assistant
//!
//! Single source of truth for scoring weights, thresholds and service
//! defaults. Settings and the matcher read these instead of repeating
//! literals.

/// Search defaults
pub mod search {
    /// Default number of ranked hits returned
    pub const DEFAULT_TOP_K: usize = 10;

    /// Upper bound a caller may request
    pub const MAX_TOP_K: usize = 50;

    /// Minimum score for a row to be accepted as the answer.
    ///
    /// One query token hitting the description field scores
    /// `scoring::DESCRIPTION_TOKEN + scoring::BLOB_TOKEN` = 8.
    pub const MIN_ACCEPT_SCORE: f32 = 8.0;

    /// Query tokens shorter than this are ignored ("no" survives)
    pub const MIN_QUERY_TOKEN_LEN: usize = 2;

    /// Shortest normalized query eligible for phrase-containment bonuses
    pub const MIN_PHRASE_BOOST_CHARS: usize = 6;

    /// Hits attached to an answer as proof
    pub const PROOF_LIMIT: usize = 6;

    /// Hits shown by the debug search endpoint
    pub const DEBUG_SAMPLE: usize = 5;
}

/// Additive scoring weights
pub mod scoring {
    /// Query token present anywhere in the row text
    pub const BLOB_TOKEN: f32 = 2.0;

    /// Query token present in the issue/scenario description
    pub const DESCRIPTION_TOKEN: f32 = 6.0;

    /// Query token present in the "guest says" field
    pub const GUEST_SAYS_TOKEN: f32 = 5.0;

    /// Query token present in the summary / "what to do" field
    pub const SUMMARY_TOKEN: f32 = 3.0;

    /// Query token present in the curated keyword list
    pub const KEYWORD_TOKEN: f32 = 4.0;

    /// Whole query contained in the description
    pub const DESCRIPTION_PHRASE: f32 = 28.0;

    /// Whole query contained in the "guest says" field
    pub const GUEST_SAYS_PHRASE: f32 = 20.0;

    /// Known high-value phrase present in both query and row
    pub const DOMAIN_PHRASE: f32 = 28.0;
}

/// Knowledge source defaults
pub mod knowledge {
    /// Default knowledge file, relative to the working directory
    pub const DEFAULT_PATH: &str = "knowledge/matrix-2026.json";

    /// Label used when citing the knowledge source
    pub const DEFAULT_SOURCE_LABEL: &str = "Matrix-2026";
}

/// Service endpoints
pub mod endpoints {
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    pub const DEFAULT_PORT: u16 = 5050;

    /// Origin allowed when CORS is enabled with no configured origins
    pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_matches_single_description_hit() {
        assert_eq!(
            search::MIN_ACCEPT_SCORE,
            scoring::DESCRIPTION_TOKEN + scoring::BLOB_TOKEN
        );
    }

    #[test]
    fn test_field_weights_exceed_blob_weight() {
        assert!(scoring::DESCRIPTION_TOKEN > scoring::BLOB_TOKEN);
        assert!(scoring::GUEST_SAYS_TOKEN > scoring::BLOB_TOKEN);
        assert!(scoring::SUMMARY_TOKEN > scoring::BLOB_TOKEN);
        assert!(scoring::KEYWORD_TOKEN > scoring::BLOB_TOKEN);
    }

    #[test]
    fn test_top_k_bounds() {
        assert!(search::DEFAULT_TOP_K <= search::MAX_TOP_K);
        assert!(search::PROOF_LIMIT <= search::DEFAULT_TOP_K);
    }
}

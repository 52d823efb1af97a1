//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, knowledge, search};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Knowledge source
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Matching and ranking
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_knowledge()?;
        self.validate_search()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured; \
                 only {} will be allowed",
                endpoints::DEFAULT_CORS_ORIGIN
            );
        }

        if self.environment.is_production() && server.admin_api_key.is_none() {
            tracing::warn!(
                "No admin API key configured in production; /admin routes are unauthenticated. \
                 Set COMPLIANCE_ASSIST__SERVER__ADMIN_API_KEY"
            );
        }

        Ok(())
    }

    fn validate_knowledge(&self) -> Result<(), ConfigError> {
        if self.knowledge.path.trim().is_empty() {
            return Err(ConfigError::MissingField("knowledge.path".to_string()));
        }
        Ok(())
    }

    fn validate_search(&self) -> Result<(), ConfigError> {
        let search = &self.search;

        if search.max_top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_top_k".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if search.top_k == 0 || search.top_k > search.max_top_k {
            return Err(ConfigError::InvalidValue {
                field: "search.top_k".to_string(),
                message: format!(
                    "Must be between 1 and {} (search.max_top_k), got {}",
                    search.max_top_k, search.top_k
                ),
            });
        }

        if !search.min_score.is_finite() || search.min_score < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "search.min_score".to_string(),
                message: format!("Must be a non-negative number, got {}", search.min_score),
            });
        }

        if search.min_query_token_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.min_query_token_len".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Bearer key required by `/admin/*` routes; unset leaves them open
    #[serde(default)]
    pub admin_api_key: Option<String>,
}

fn default_host() -> String {
    endpoints::DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    endpoints::DEFAULT_PORT
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            admin_api_key: None,
        }
    }
}

/// Knowledge source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Path to the knowledge file (JSON or YAML)
    #[serde(default = "default_knowledge_path")]
    pub path: String,

    /// Label used in citations, e.g. "Matrix-2026"
    #[serde(default = "default_source_label")]
    pub source_label: String,

    /// Start even when the knowledge file holds no rows
    #[serde(default)]
    pub allow_empty: bool,
}

fn default_knowledge_path() -> String {
    knowledge::DEFAULT_PATH.to_string()
}
fn default_source_label() -> String {
    knowledge::DEFAULT_SOURCE_LABEL.to_string()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            source_label: default_source_label(),
            allow_empty: false,
        }
    }
}

/// Matching and ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of ranked hits
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Largest top-k a caller may request
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Acceptance threshold on the additive score
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Query tokens shorter than this are dropped
    #[serde(default = "default_min_query_token_len")]
    pub min_query_token_len: usize,

    /// Hits attached to an answer as proof
    #[serde(default = "default_proof_limit")]
    pub proof_limit: usize,

    /// Optional YAML/JSON file overriding the built-in vocabulary
    #[serde(default)]
    pub vocabulary_path: Option<String>,
}

fn default_top_k() -> usize {
    search::DEFAULT_TOP_K
}
fn default_max_top_k() -> usize {
    search::MAX_TOP_K
}
fn default_min_score() -> f32 {
    search::MIN_ACCEPT_SCORE
}
fn default_min_query_token_len() -> usize {
    search::MIN_QUERY_TOKEN_LEN
}
fn default_proof_limit() -> usize {
    search::PROOF_LIMIT
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            min_score: default_min_score(),
            min_query_token_len: default_min_query_token_len(),
            proof_limit: default_proof_limit(),
            vocabulary_path: None,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Install the Prometheus recorder and serve /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (COMPLIANCE_ASSIST__ prefix, `__` separator)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("COMPLIANCE_ASSIST")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5050);
        assert_eq!(settings.knowledge.path, "knowledge/matrix-2026.json");
        assert_eq!(settings.search.top_k, 10);
        assert!(!settings.knowledge.allow_empty);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_knowledge_path() {
        let mut settings = Settings::default();
        settings.knowledge.path = "   ".to_string();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::MissingField(field)) if field == "knowledge.path"
        ));
    }

    #[test]
    fn test_top_k_validation() {
        let mut settings = Settings::default();

        settings.search.top_k = 0;
        assert!(settings.validate_search().is_err());

        settings.search.top_k = settings.search.max_top_k + 1;
        assert!(settings.validate_search().is_err());

        settings.search.top_k = 5;
        assert!(settings.validate_search().is_ok());
    }

    #[test]
    fn test_min_score_validation() {
        let mut settings = Settings::default();

        settings.search.min_score = -1.0;
        assert!(settings.validate_search().is_err());

        settings.search.min_score = f32::NAN;
        assert!(settings.validate_search().is_err());

        settings.search.min_score = 0.0;
        assert!(settings.validate_search().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate_server().is_err());

        settings.server.port = 8080;
        settings.server.timeout_seconds = 0;
        assert!(settings.validate_server().is_err());
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let yaml = r#"
environment: production
knowledge:
  path: data/kb.json
search:
  min_score: 12.5
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.environment.is_production());
        assert_eq!(settings.knowledge.path, "data/kb.json");
        assert_eq!(settings.knowledge.source_label, "Matrix-2026");
        assert_eq!(settings.search.min_score, 12.5);
        assert_eq!(settings.search.top_k, 10);
    }
}

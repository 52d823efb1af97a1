//! Configuration management for the compliance assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files (config/default, config/{env})
//! - Environment variables (COMPLIANCE_ASSIST__ prefix)
//!
//! Search vocabulary (stopwords, synonyms, expansion rules, boost phrases)
//! ships with built-in defaults and can be replaced per list from a file.

pub mod constants;
pub mod settings;
pub mod vocabulary;

pub use settings::{
    load_settings, KnowledgeConfig, ObservabilityConfig, RuntimeEnvironment, SearchConfig,
    ServerConfig, Settings,
};
pub use vocabulary::{ExpansionRule, PhraseSynonym, VocabularyConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

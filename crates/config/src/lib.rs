//! Configuration management for the voice assistant
//!
//! Supports loading configuration from:
//! - YAML files under `config/` (`default` then the environment overlay)
//! - Environment variables (`VOICE_ASSISTANT__` prefix, `__` separator)

pub mod agent;
pub mod constants;
pub mod settings;

pub use agent::{DialogueConfig, LlmConfig};
pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, RuntimeEnvironment, ServerConfig,
    Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

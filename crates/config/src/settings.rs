//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{dialogue, server};
use crate::{ConfigError, DialogueConfig, LlmConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion service configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Dialogue engine configuration
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_llm()?;
        self.validate_dialogue()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if llm.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.endpoint".to_string()));
        }

        if llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_secs".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if llm.max_retries > 10 {
            tracing::warn!(
                max_retries = llm.max_retries,
                "llm.max_retries is high, a failing service will block turns for a long time"
            );
        }

        Ok(())
    }

    fn validate_dialogue(&self) -> Result<(), ConfigError> {
        // A user turn and its reply must both fit in the window
        if self.dialogue.max_turns < 2 {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.max_turns".to_string(),
                message: format!("Must be at least 2, got {}", self.dialogue.max_turns),
            });
        }

        if self.dialogue.confirm_field.trim().is_empty() {
            return Err(ConfigError::MissingField("dialogue.confirm_field".to_string()));
        }

        // Confirmation normalizes and extracts email addresses only
        if self.dialogue.confirm_field != dialogue::CONFIRM_FIELD {
            return Err(ConfigError::InvalidValue {
                field: "dialogue.confirm_field".to_string(),
                message: format!(
                    "Only '{}' can be confirmed, got '{}'",
                    dialogue::CONFIRM_FIELD,
                    self.dialogue.confirm_field
                ),
            });
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.server.cleanup_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.cleanup_interval_secs".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Resolve the completion-service credential from the environment
    ///
    /// A missing or empty variable is an error; callers treat it as fatal at
    /// startup.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.llm.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::Environment(format!(
                "API key not found. Please set the '{}' environment variable.",
                self.llm.api_key_env
            ))),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum concurrent dialogue sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time after which a session is removed
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,

    /// How often idle sessions are swept
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    server::DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    server::DEFAULT_PORT
}
fn default_max_sessions() -> usize {
    server::DEFAULT_MAX_SESSIONS
}
fn default_session_timeout() -> u64 {
    server::DEFAULT_SESSION_TIMEOUT_SECS
}
fn default_cleanup_interval() -> u64 {
    server::DEFAULT_CLEANUP_INTERVAL_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
            session_timeout_secs: default_session_timeout(),
            cleanup_interval_secs: default_cleanup_interval(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable metrics
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

/// Load settings from `config/` in the working directory
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::from(dir.join("default")).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("VOICE_ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    // Validate
    settings.validate()?;

    Ok(settings)
}

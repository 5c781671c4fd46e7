//! Dialogue and completion-service configuration

use serde::{Deserialize, Serialize};

use crate::constants::{dialogue, llm};

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Maximum output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in milliseconds (doubles each retry)
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_endpoint() -> String {
    llm::OPENAI_ENDPOINT.to_string()
}
fn default_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}
fn default_api_key_env() -> String {
    llm::DEFAULT_API_KEY_ENV.to_string()
}
fn default_max_tokens() -> u32 {
    llm::DEFAULT_MAX_TOKENS
}
fn default_temperature() -> f32 {
    llm::DEFAULT_TEMPERATURE
}
fn default_timeout_secs() -> u64 {
    llm::DEFAULT_TIMEOUT_SECS
}
fn default_max_retries() -> u32 {
    llm::DEFAULT_MAX_RETRIES
}
fn default_initial_backoff_ms() -> u64 {
    llm::DEFAULT_INITIAL_BACKOFF_MS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

/// Dialogue engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Turns kept in the sliding window replayed to the model
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Ask the model whether the conversation is over after plain replies
    #[serde(default = "default_true")]
    pub finished_check: bool,

    /// Field confirmed with the user before dispatch
    #[serde(default = "default_confirm_field")]
    pub confirm_field: String,
}

fn default_max_turns() -> usize {
    dialogue::DEFAULT_MAX_TURNS
}
fn default_confirm_field() -> String {
    dialogue::CONFIRM_FIELD.to_string()
}
fn default_true() -> bool {
    true
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            finished_check: true,
            confirm_field: default_confirm_field(),
        }
    }
}

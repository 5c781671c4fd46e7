//! Chat-completion integration
//!
//! Features:
//! - Completion backend trait with an OpenAI-compatible HTTP implementation
//! - Completion requester with exponential-backoff retry
//! - Function-call extraction from completion responses

pub mod backend;
pub mod extractor;
pub mod requester;

pub use backend::{CompletionBackend, OpenAIBackend, OpenAIConfig};
pub use extractor::{extract, parse_arguments, CompletionOutcome};
pub use requester::{CompletionRequester, RequestOptions, RetryPolicy};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },
}

impl LlmError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Network(_)
                | LlmError::Timeout
                | LlmError::RateLimited(_)
                | LlmError::ServerError { .. }
        )
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for voice_assistant_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::InvalidResponse(msg) => voice_assistant_core::Error::Protocol(msg),
            other => voice_assistant_core::Error::ServiceUnavailable(other.to_string()),
        }
    }
}

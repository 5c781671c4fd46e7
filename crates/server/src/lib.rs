//! Voice Assistant Server
//!
//! HTTP endpoints over dialogue sessions, plus the console collaborators
//! used by the interactive CLI.

pub mod console;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod session;
pub mod state;

pub use console::{speak_reply, ConsoleSpeaker, LineInput};
pub use http::create_router;
pub use logging::init_tracing;
pub use metrics::{init_metrics, metrics_handler};
pub use session::{SessionHandle, SessionManager};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Max sessions reached")]
    CapacityReached,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::CapacityReached => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Config(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<voice_assistant_config::ConfigError> for ServerError {
    fn from(err: voice_assistant_config::ConfigError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<voice_assistant_agent::AgentError> for ServerError {
    fn from(err: voice_assistant_agent::AgentError) -> Self {
        match err {
            voice_assistant_agent::AgentError::Config(message) => ServerError::Config(message),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

//! Dialogue engine for the voice assistant
//!
//! Features:
//! - Bounded turn log replayed to the completion service
//! - Slot filling for function calls with missing arguments
//! - Email confirmation with spoken-form normalization
//! - Function dispatch through the action registry
//! - Finished-conversation detection

pub mod agent_config;
pub mod confirmation;
pub mod dispatch;
pub mod finished;
pub mod session;
pub mod slots;
pub mod turn_log;

pub use agent_config::AgentConfig;
pub use confirmation::{ConfirmationEngine, ConfirmationState, ConfirmationStep};
pub use dispatch::{DispatchOutcome, FunctionDispatcher};
pub use finished::{is_affirmative_answer, FinishedDetector};
pub use session::{DialogueResult, DialogueServices, DialogueSession, DialogueState};
pub use slots::{slot_value, PendingFunctionCall};
pub use turn_log::TurnLog;

use thiserror::Error;

/// Agent errors
///
/// Raised while assembling shared services; once a session runs, failures
/// are folded into its replies.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<voice_assistant_config::ConfigError> for AgentError {
    fn from(err: voice_assistant_config::ConfigError) -> Self {
        AgentError::Config(err.to_string())
    }
}

impl From<voice_assistant_llm::LlmError> for AgentError {
    fn from(err: voice_assistant_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

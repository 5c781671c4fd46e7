//! Function-call actions for the voice assistant
//!
//! An [`Action`] is the side-effecting implementation behind a function the
//! completion service may call. Actions are looked up by name in an
//! [`ActionRegistry`] and executed under their own timeout.

pub mod action;
pub mod integrations;
pub mod registry;
pub mod ticket;

pub use action::{Action, ActionOutput};
pub use integrations::{
    IntegrationError, StubTicketingIntegration, TicketRequest, TicketingIntegration,
};
pub use registry::{create_default_registry, ActionRegistry};
pub use ticket::CreateTicketAction;

use thiserror::Error;
use voice_assistant_core::ValidationError;

/// Action execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Action not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Action '{name}' timed out after {secs}s")]
    Timeout { name: String, secs: u64 },

    #[error("Execution failed: {0}")]
    Execution(String),
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        ToolError::NotFound(name.into())
    }

    pub fn timeout(name: impl Into<String>, secs: u64) -> Self {
        ToolError::Timeout {
            name: name.into(),
            secs,
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        ToolError::Execution(message.into())
    }

    /// Short cause suitable for "... due to {reason}"
    pub fn reason(&self) -> String {
        match self {
            ToolError::NotFound(name) => format!("a missing action '{}'", name),
            ToolError::Validation(err) => format!("an invalid {}", err.field),
            ToolError::Timeout { secs, .. } => format!("a timeout after {} seconds", secs),
            ToolError::Execution(message) => message.clone(),
        }
    }
}

impl From<ToolError> for voice_assistant_core::Error {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => voice_assistant_core::Error::UnknownFunction(name),
            ToolError::Validation(err) => err.into(),
            other => voice_assistant_core::Error::Dispatch(other.reason()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_assistant_core::Error;

    #[test]
    fn test_reason_text() {
        assert_eq!(ToolError::timeout("CreateTicket", 10).reason(), "a timeout after 10 seconds");
        assert_eq!(ToolError::execution("the service being down").reason(), "the service being down");
    }

    #[test]
    fn test_core_error_mapping() {
        let err: Error = ToolError::not_found("ResetPassword").into();
        assert_eq!(err, Error::UnknownFunction("ResetPassword".into()));

        let err: Error = ToolError::from(ValidationError::new("email", "bad")).into();
        assert!(matches!(err, Error::Validation { .. }));

        let err: Error = ToolError::execution("boom").into();
        assert_eq!(err, Error::Dispatch("boom".into()));
    }
}

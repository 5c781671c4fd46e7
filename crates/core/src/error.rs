//! Error types shared across the voice assistant
//!
//! Every variant is recoverable at the dialogue-turn boundary: the session
//! converts it into an assistant message instead of propagating it.

use thiserror::Error;

/// Result alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Completion service unreachable or failing after all retries
    #[error("Completion service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Malformed or unexpected completion response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A single argument failed validation
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The side-effecting action failed
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// The model asked for a function with no registered action
    #[error("Function '{0}' is not implemented.")]
    UnknownFunction(String),

    /// Speech input/output collaborator failure
    #[error("Speech error: {0}")]
    Speech(String),
}

impl Error {
    /// Text shown (and spoken) to the user when this error ends a turn
    pub fn user_message(&self) -> String {
        match self {
            Error::ServiceUnavailable(_) | Error::Protocol(_) => {
                "I'm sorry, I'm having trouble reaching the assistant service right now. \
                 Please try again."
                    .to_string()
            },
            Error::Validation { field, .. } => {
                format!("That {} doesn't look right. Please provide it again.", field)
            },
            Error::Dispatch(reason) => {
                format!("I was unable to complete that request due to {}.", reason)
            },
            Error::UnknownFunction(name) => format!("Function '{}' is not implemented.", name),
            Error::Speech(_) => "Sorry, I couldn't process the audio.".to_string(),
        }
    }

    /// True for failures talking to the completion service
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Error::ServiceUnavailable(_) | Error::Protocol(_))
    }
}

/// Field-level validation failure reported by an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

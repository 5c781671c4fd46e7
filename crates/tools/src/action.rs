//! Action trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use voice_assistant_core::{FunctionArguments, FunctionSchema, ValidationError};

use crate::ToolError;

/// Default timeout for action execution (30 seconds)
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 30;

/// Result of a successful action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutput {
    /// Assistant text reporting the result to the user
    pub message: String,
    /// Structured result (e.g. the created ticket)
    pub data: Value,
}

impl ActionOutput {
    pub fn new(message: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Side-effecting implementation of a declared function
#[async_trait]
pub trait Action: Send + Sync {
    /// Function declaration offered to the completion service
    fn schema(&self) -> FunctionSchema;

    /// Function name; must match `schema().name`
    fn name(&self) -> &str;

    /// Check arguments before execution
    ///
    /// The default only checks that required parameters are present.
    fn validate(&self, args: &FunctionArguments) -> Result<(), ValidationError> {
        match self.schema().missing_required(args).into_iter().next() {
            Some(field) => Err(ValidationError::new(field, "is required")),
            None => Ok(()),
        }
    }

    /// Perform the action
    async fn execute(&self, args: FunctionArguments) -> Result<ActionOutput, ToolError>;

    /// Execution timeout in seconds
    fn timeout_secs(&self) -> u64 {
        DEFAULT_ACTION_TIMEOUT_SECS
    }

    /// Assistant text reporting a failed execution
    fn failure_message(&self, error: &ToolError) -> String {
        format!(
            "I was unable to complete {} due to {}.",
            self.name(),
            error.reason()
        )
    }
}

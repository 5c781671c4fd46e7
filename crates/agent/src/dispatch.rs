//! Function dispatch
//!
//! Runs a confirmed function call through the action registry and folds the
//! result into the text the user hears.

use std::sync::Arc;

use serde_json::Value;
use voice_assistant_core::{Error, FunctionArguments, ValidationError};
use voice_assistant_tools::{ActionRegistry, ToolError};

/// Result of dispatching one function call
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The action ran; `message` is the reply for the user
    Success { message: String, output: Value },
    /// The action ran and failed
    Failed { message: String, error: Error },
    /// An argument was rejected before the action ran
    Invalid(ValidationError),
    /// No action is registered under the requested name
    UnknownFunction { message: String },
}

impl DispatchOutcome {
    fn status(&self) -> &'static str {
        match self {
            DispatchOutcome::Success { .. } => "success",
            DispatchOutcome::Failed { .. } => "failed",
            DispatchOutcome::Invalid(_) => "invalid",
            DispatchOutcome::UnknownFunction { .. } => "unknown",
        }
    }
}

/// Executes function calls against a shared [`ActionRegistry`]
#[derive(Clone)]
pub struct FunctionDispatcher {
    registry: Arc<ActionRegistry>,
}

impl FunctionDispatcher {
    pub fn new(registry: Arc<ActionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    /// Validate and execute `function` with `arguments`
    pub async fn dispatch(&self, function: &str, arguments: FunctionArguments) -> DispatchOutcome {
        let outcome = match self.registry.get(function).cloned() {
            None => DispatchOutcome::UnknownFunction {
                message: Error::UnknownFunction(function.to_string()).user_message(),
            },
            Some(action) => match self.registry.execute(function, arguments).await {
                Ok(output) => DispatchOutcome::Success {
                    message: output.message,
                    output: output.data,
                },
                Err(ToolError::Validation(err)) => DispatchOutcome::Invalid(err),
                Err(err) => DispatchOutcome::Failed {
                    message: action.failure_message(&err),
                    error: err.into(),
                },
            },
        };

        match &outcome {
            DispatchOutcome::Success { .. } => {
                tracing::info!(function, "Function dispatched");
            },
            DispatchOutcome::Failed { error, .. } => {
                tracing::warn!(function, error = %error, "Function dispatch failed");
            },
            DispatchOutcome::Invalid(err) => {
                tracing::debug!(function, field = %err.field, "Dispatch rejected argument");
            },
            DispatchOutcome::UnknownFunction { .. } => {
                tracing::warn!(function, "Requested function is not registered");
            },
        }
        metrics::counter!("dispatch_total", "status" => outcome.status()).increment(1);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use voice_assistant_tools::{
        create_default_registry, IntegrationError, StubTicketingIntegration, TicketRequest,
        TicketingIntegration,
    };

    struct DownIntegration;

    #[async_trait]
    impl TicketingIntegration for DownIntegration {
        async fn create_ticket(&self, _ticket: TicketRequest) -> Result<String, IntegrationError> {
            Err(IntegrationError::Internal("the helpdesk being offline".into()))
        }
    }

    fn args() -> FunctionArguments {
        let mut args = FunctionArguments::new();
        args.insert("name".into(), json!("John"));
        args.insert("email".into(), json!("john@example.com"));
        args.insert("issue".into(), json!("printer jam"));
        args
    }

    fn dispatcher(integration: Arc<dyn TicketingIntegration>) -> FunctionDispatcher {
        FunctionDispatcher::new(Arc::new(create_default_registry(integration)))
    }

    #[tokio::test]
    async fn test_success() {
        let outcome = dispatcher(Arc::new(StubTicketingIntegration::new()))
            .dispatch("CreateTicket", args())
            .await;
        match outcome {
            DispatchOutcome::Success { message, output } => {
                assert!(message.starts_with("Ticket created successfully with ID: TKT-"));
                assert!(message.ends_with("Is there anything else I can help with?"));
                assert_eq!(output["email"], json!("john@example.com"));
            },
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_names_reason() {
        let outcome = dispatcher(Arc::new(DownIntegration)).dispatch("CreateTicket", args()).await;
        match outcome {
            DispatchOutcome::Failed { message, error } => {
                assert_eq!(
                    message,
                    "I was unable to create the ticket due to the helpdesk being offline. \
                     Please provide your email address again so I can retry."
                );
                assert_eq!(error, Error::Dispatch("the helpdesk being offline".into()));
            },
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_argument() {
        let mut bad = args();
        bad.insert("email".into(), json!("john"));
        let outcome = dispatcher(Arc::new(StubTicketingIntegration::new()))
            .dispatch("CreateTicket", bad)
            .await;
        assert!(matches!(outcome, DispatchOutcome::Invalid(ref e) if e.field == "email"));
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let outcome = dispatcher(Arc::new(StubTicketingIntegration::new()))
            .dispatch("ResetPassword", args())
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::UnknownFunction {
                message: "Function 'ResetPassword' is not implemented.".into()
            }
        );
    }
}

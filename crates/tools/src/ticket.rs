//! Create Ticket Action
//!
//! Open a support ticket with the user's details and issue description.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use voice_assistant_core::{argument_str, FunctionArguments, FunctionSchema, ValidationError};
use voice_assistant_text_processing::is_valid_email;

use crate::action::{Action, ActionOutput};
use crate::integrations::{StubTicketingIntegration, TicketRequest, TicketingIntegration};
use crate::ToolError;

/// Function name offered to the completion service
pub const CREATE_TICKET: &str = "CreateTicket";

/// Ticket creation action
pub struct CreateTicketAction {
    integration: Arc<dyn TicketingIntegration>,
    timeout_secs: u64,
}

impl CreateTicketAction {
    pub fn new(integration: Arc<dyn TicketingIntegration>) -> Self {
        Self {
            integration,
            timeout_secs: 10,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn ticket_request(args: &FunctionArguments) -> Result<TicketRequest, ValidationError> {
        let field = |name: &str| {
            argument_str(args, name)
                .map(str::to_string)
                .ok_or_else(|| ValidationError::new(name, "is required"))
        };

        Ok(TicketRequest {
            name: field("name")?,
            email: field("email")?,
            issue: field("issue")?,
            contact_number: argument_str(args, "contact_number").map(str::to_string),
        })
    }
}

impl Default for CreateTicketAction {
    fn default() -> Self {
        Self::new(Arc::new(StubTicketingIntegration::new()))
    }
}

#[async_trait]
impl Action for CreateTicketAction {
    fn name(&self) -> &str {
        CREATE_TICKET
    }

    fn schema(&self) -> FunctionSchema {
        FunctionSchema::builder(
            CREATE_TICKET,
            "Creates a support ticket with the provided user details and issue description.",
        )
        .param("name", "string", "The name of the user.", true)
        .param("email", "string", "The user's email address.", true)
        .param("issue", "string", "Description of the issue.", true)
        .param("contact_number", "string", "The user's contact number (optional).", false)
        .build()
    }

    fn validate(&self, args: &FunctionArguments) -> Result<(), ValidationError> {
        let ticket = Self::ticket_request(args)?;

        if !is_valid_email(&ticket.email) {
            return Err(ValidationError::new("email", "is not a valid email address"));
        }

        if let Some(ref number) = ticket.contact_number {
            // Formatting is free; the digits must make a 10-digit number
            if number.chars().filter(char::is_ascii_digit).count() != 10 {
                return Err(ValidationError::new("contact_number", "must be a 10-digit phone number"));
            }
        }

        Ok(())
    }

    async fn execute(&self, args: FunctionArguments) -> Result<ActionOutput, ToolError> {
        let ticket = Self::ticket_request(&args)?;

        tracing::debug!(
            integration = self.integration.name(),
            name = %ticket.name,
            has_contact_number = ticket.contact_number.is_some(),
            "Creating ticket"
        );

        let ticket_id = self.integration.create_ticket(ticket.clone()).await?;

        let data = json!({
            "ticket_id": ticket_id,
            "name": ticket.name,
            "email": ticket.email,
            "issue": ticket.issue,
            "contact_number": ticket.contact_number,
            "created_at": Utc::now().to_rfc3339(),
        });

        Ok(ActionOutput::new(
            format!(
                "Ticket created successfully with ID: {}. Is there anything else I can help with?",
                ticket_id
            ),
            data,
        ))
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn failure_message(&self, error: &ToolError) -> String {
        format!(
            "I was unable to create the ticket due to {}. Please provide your email address again so I can retry.",
            error.reason()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::IntegrationError;
    use parking_lot::Mutex;
    use serde_json::Value;

    /// Integration recording every ticket it receives
    #[derive(Default)]
    struct RecordingIntegration {
        tickets: Mutex<Vec<TicketRequest>>,
        fail_with: Option<IntegrationError>,
    }

    #[async_trait]
    impl TicketingIntegration for RecordingIntegration {
        async fn create_ticket(&self, ticket: TicketRequest) -> Result<String, IntegrationError> {
            self.tickets.lock().push(ticket);
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok("TKT-0001".to_string()),
            }
        }
    }

    fn args(pairs: &[(&str, &str)]) -> FunctionArguments {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    fn complete_args() -> FunctionArguments {
        args(&[
            ("name", "John"),
            ("email", "john@example.com"),
            ("issue", "printer jam"),
        ])
    }

    #[test]
    fn test_schema() {
        let schema = CreateTicketAction::default().schema();
        assert_eq!(schema.name, "CreateTicket");
        let names: Vec<_> = schema.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email", "issue", "contact_number"]);
        assert_eq!(schema.required, vec!["name", "email", "issue"]);
    }

    #[test]
    fn test_validate() {
        let action = CreateTicketAction::default();
        assert!(action.validate(&complete_args()).is_ok());

        let mut bad_email = complete_args();
        bad_email.insert("email".into(), json!("john at example"));
        assert_eq!(action.validate(&bad_email).unwrap_err().field, "email");

        let mut missing = complete_args();
        missing.remove("issue");
        assert_eq!(action.validate(&missing).unwrap_err().field, "issue");

        let mut bad_phone = complete_args();
        bad_phone.insert("contact_number".into(), json!("12345"));
        assert_eq!(action.validate(&bad_phone).unwrap_err().field, "contact_number");

        let mut good_phone = complete_args();
        good_phone.insert("contact_number".into(), json!("123-456-7890"));
        assert!(action.validate(&good_phone).is_ok());

        good_phone.insert("contact_number".into(), json!("(555) 123-4567"));
        assert!(action.validate(&good_phone).is_ok());
    }

    #[tokio::test]
    async fn test_execute_success() {
        let integration = Arc::new(RecordingIntegration::default());
        let action = CreateTicketAction::new(integration.clone());

        let output = action.execute(complete_args()).await.unwrap();
        assert_eq!(
            output.message,
            "Ticket created successfully with ID: TKT-0001. Is there anything else I can help with?"
        );
        assert_eq!(output.data["ticket_id"], "TKT-0001");

        let tickets = integration.tickets.lock();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].email, "john@example.com");
        assert_eq!(tickets[0].contact_number, None);
    }

    #[tokio::test]
    async fn test_execute_failure_message() {
        let integration = Arc::new(RecordingIntegration {
            fail_with: Some(IntegrationError::Internal("the ticket queue being full".into())),
            ..Default::default()
        });
        let action = CreateTicketAction::new(integration);

        let err = action.execute(complete_args()).await.unwrap_err();
        assert_eq!(
            action.failure_message(&err),
            "I was unable to create the ticket due to the ticket queue being full. \
             Please provide your email address again so I can retry."
        );
    }
}

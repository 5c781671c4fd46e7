//! External System Integrations
//!
//! Traits and a stub for the ticketing system that fulfils created tickets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert IntegrationError to ToolError for unified error handling
impl From<IntegrationError> for crate::ToolError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::ConnectionFailed(msg) => {
                crate::ToolError::execution(format!("the ticketing system being unreachable ({})", msg))
            },
            IntegrationError::RateLimited => {
                crate::ToolError::execution("the ticketing system being busy")
            },
            IntegrationError::AuthFailed(msg)
            | IntegrationError::InvalidRequest(msg)
            | IntegrationError::Internal(msg) => crate::ToolError::execution(msg),
        }
    }
}

/// Ticket data sent to the ticketing system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Name of the user
    pub name: String,
    /// Confirmed email address
    pub email: String,
    /// Description of the issue
    pub issue: String,
    /// Contact number (optional)
    pub contact_number: Option<String>,
}

/// Ticketing integration trait
///
/// Implement this trait to integrate with a helpdesk system
/// (e.g., Zendesk, Jira Service Management, Freshdesk).
#[async_trait]
pub trait TicketingIntegration: Send + Sync {
    /// Create a ticket, returning its identifier
    async fn create_ticket(&self, ticket: TicketRequest) -> Result<String, IntegrationError>;

    /// Integration name for logs
    fn name(&self) -> &str {
        "ticketing"
    }
}

/// Stub ticketing integration
///
/// Accepts every ticket and returns a `TKT-XXXXXXXX` identifier.
pub struct StubTicketingIntegration;

impl StubTicketingIntegration {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubTicketingIntegration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketingIntegration for StubTicketingIntegration {
    async fn create_ticket(&self, ticket: TicketRequest) -> Result<String, IntegrationError> {
        let id = format!(
            "TKT-{}",
            uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
        );
        tracing::info!(ticket_id = %id, name = %ticket.name, "Stub ticketing: Created ticket");
        Ok(id)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

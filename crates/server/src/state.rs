//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use voice_assistant_agent::{AgentConfig, DialogueServices};
use voice_assistant_config::Settings;

use crate::session::SessionManager;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Settings>,
    /// Session manager
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Create application state around already-built services
    pub fn new(config: Settings, services: DialogueServices) -> Self {
        let agent_config = AgentConfig::from(&config.dialogue);
        let sessions = SessionManager::with_config(services, agent_config, &config.server);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }

    /// Create application state talking to the configured completion service
    ///
    /// Fails when the credential is missing.
    pub fn from_settings(config: Settings) -> Result<Self, ServerError> {
        let services = DialogueServices::from_settings(&config)?;
        Ok(Self::new(config, services))
    }

    /// Model used by every session
    pub fn model_name(&self) -> &str {
        self.sessions.model_name()
    }
}

//! Dialogue Session Configuration
//!
//! Configuration for [`crate::DialogueSession`].

use voice_assistant_config::DialogueConfig;
use voice_assistant_config::constants::dialogue;

/// Per-session dialogue configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Turns kept in the log replayed to the completion service
    pub max_turns: usize,
    /// Ask whether the conversation is finished after plain replies
    pub finished_check: bool,
    /// Argument confirmed with the user before dispatch
    pub confirm_field: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: dialogue::DEFAULT_MAX_TURNS,
            finished_check: true,
            confirm_field: dialogue::CONFIRM_FIELD.to_string(),
        }
    }
}

impl From<&DialogueConfig> for AgentConfig {
    fn from(config: &DialogueConfig) -> Self {
        Self {
            max_turns: config.max_turns,
            finished_check: config.finished_check,
            confirm_field: config.confirm_field.clone(),
        }
    }
}

impl AgentConfig {
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_finished_check(mut self, enabled: bool) -> Self {
        self.finished_check = enabled;
        self
    }
}

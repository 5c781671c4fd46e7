//! Action Registry
//!
//! Manages action registration, lookup, and execution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use voice_assistant_core::{FunctionArguments, FunctionSchema};

use crate::action::{Action, ActionOutput};
use crate::integrations::TicketingIntegration;
use crate::ticket::CreateTicketAction;
use crate::ToolError;

/// Action registry
///
/// Keeps registration order so function schemas are always offered to the
/// completion service in the same order.
pub struct ActionRegistry {
    actions: Vec<Arc<dyn Action>>,
    index: HashMap<String, usize>,
}

impl ActionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register an action
    pub fn register<A: Action + 'static>(&mut self, action: A) {
        self.register_arc(Arc::new(action));
    }

    /// Register a shared action; replaces any action with the same name
    pub fn register_arc(&mut self, action: Arc<dyn Action>) {
        let name = action.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => self.actions[slot] = action,
            None => {
                self.index.insert(name, self.actions.len());
                self.actions.push(action);
            },
        }
    }

    /// Get action by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.index.get(name).map(|&slot| &self.actions[slot])
    }

    /// Check if action exists
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get number of registered actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action names in registration order
    pub fn names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.name().to_string()).collect()
    }

    /// Function schemas in registration order
    pub fn schemas(&self) -> Vec<FunctionSchema> {
        self.actions.iter().map(|a| a.schema()).collect()
    }

    /// Execute an action with validation and timeout protection
    pub async fn execute(
        &self,
        name: &str,
        arguments: FunctionArguments,
    ) -> Result<ActionOutput, ToolError> {
        let action = self.get(name).ok_or_else(|| ToolError::not_found(name))?;

        // Validate input
        action.validate(&arguments)?;

        let timeout_secs = action.timeout_secs();
        let timeout_duration = Duration::from_secs(timeout_secs);

        tracing::trace!(
            action = name,
            timeout_secs = timeout_secs,
            "Executing action with timeout"
        );

        match tokio::time::timeout(timeout_duration, action.execute(arguments)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ToolError::timeout(name, timeout_secs)),
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry with the ticket action wired to the given integration
pub fn create_default_registry(integration: Arc<dyn TicketingIntegration>) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(CreateTicketAction::new(integration));
    registry
}

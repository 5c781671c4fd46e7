//! Email confirmation sub-dialogue
//!
//! Once every required argument is present, the confirmable field is read
//! back to the user. A reply may correct the value, confirm it, deny it, or
//! be unclear. A phone number spoken in any reply is kept as the contact
//! number whatever the outcome.

use std::sync::Arc;

use serde_json::Value;
use voice_assistant_core::{
    argument_str, ConfirmationClassifier, ConfirmationIntent, FunctionArguments,
};
use voice_assistant_text_processing::{extract_email, extract_phone_number};

use crate::slots::PendingFunctionCall;

/// Argument that receives a phone number heard during confirmation
pub const CONTACT_NUMBER_FIELD: &str = "contact_number";

/// Prompt after a denial
pub const DENIED_PROMPT: &str = "It seems like the email is incorrect. Please provide a new email address.";

/// A function call waiting for the user to confirm one argument
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationState {
    pub function: String,
    pub arguments: FunctionArguments,
    /// Argument being confirmed
    pub field: String,
    /// Set once the question has been asked
    pub awaiting: bool,
}

impl ConfirmationState {
    pub fn new(function: impl Into<String>, arguments: FunctionArguments, field: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            arguments,
            field: field.into(),
            awaiting: true,
        }
    }

    /// Current value of the field under confirmation
    pub fn value(&self) -> &str {
        argument_str(&self.arguments, &self.field).unwrap_or_default()
    }

    /// Question asking the user to confirm the current value
    pub fn prompt(&self) -> String {
        confirm_prompt(self.value())
    }
}

/// Result of handling one reply during confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationStep {
    /// A different address was given; confirm the new one
    Corrected(ConfirmationState),
    /// Neither yes nor no; ask again
    Unclear(ConfirmationState),
    /// Ready to dispatch
    Confirmed(ConfirmationState),
    /// Ask for the field again through slot filling
    Denied(PendingFunctionCall),
}

impl ConfirmationStep {
    pub fn name(&self) -> &'static str {
        match self {
            ConfirmationStep::Corrected(_) => "corrected",
            ConfirmationStep::Unclear(_) => "unclear",
            ConfirmationStep::Confirmed(_) => "confirmed",
            ConfirmationStep::Denied(_) => "denied",
        }
    }
}

/// Drives the confirmation protocol with a pluggable yes/no classifier
#[derive(Clone)]
pub struct ConfirmationEngine {
    classifier: Arc<dyn ConfirmationClassifier>,
}

impl ConfirmationEngine {
    pub fn new(classifier: Arc<dyn ConfirmationClassifier>) -> Self {
        Self { classifier }
    }

    /// Handle one reply to the confirmation question
    pub fn handle(&self, mut state: ConfirmationState, utterance: &str) -> ConfirmationStep {
        if let Some(number) = extract_phone_number(utterance) {
            tracing::debug!(function = %state.function, "Contact number heard during confirmation");
            state
                .arguments
                .insert(CONTACT_NUMBER_FIELD.to_string(), Value::String(number));
        }

        if let Some(email) = extract_email(utterance) {
            if !email.eq_ignore_ascii_case(state.value()) {
                tracing::info!(field = %state.field, "Confirmation value corrected");
                state.arguments.insert(state.field.clone(), Value::String(email));
                state.awaiting = true;
                return ConfirmationStep::Corrected(state);
            }
        }

        match self.classifier.classify(utterance) {
            ConfirmationIntent::Affirm => {
                tracing::info!(field = %state.field, "Confirmation accepted");
                state.awaiting = false;
                ConfirmationStep::Confirmed(state)
            },
            ConfirmationIntent::Deny => {
                tracing::info!(field = %state.field, "Confirmation denied");
                ConfirmationStep::Denied(PendingFunctionCall::requiring(
                    state.function,
                    state.arguments,
                    state.field,
                ))
            },
            ConfirmationIntent::Unclear => {
                tracing::debug!(
                    field = %state.field,
                    classifier = self.classifier.name(),
                    "Confirmation reply unclear"
                );
                ConfirmationStep::Unclear(state)
            },
        }
    }
}

/// Question reading back the value to confirm
pub fn confirm_prompt(email: &str) -> String {
    format!(
        "Please confirm if the email **{}** is correct or provide a new email.",
        email
    )
}

/// Question after the user supplied a different value
pub fn correction_prompt(email: &str) -> String {
    format!("You provided a new email: **{}**. Is this correct? (yes/no)", email)
}

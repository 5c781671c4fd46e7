//! Text interpretation traits

/// Interpretation of a reply to a yes/no confirmation question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationIntent {
    /// The user agreed
    Affirm,
    /// The user disagreed
    Deny,
    /// Neither could be determined
    Unclear,
}

/// Yes/no classifier used by the confirmation sub-dialogue
///
/// Keyword matching is the default; a better matcher can be plugged in
/// without changing the dialogue state machine.
pub trait ConfirmationClassifier: Send + Sync {
    /// Classify a free-form reply
    fn classify(&self, reply: &str) -> ConfirmationIntent;

    /// Classifier name for logging
    fn name(&self) -> &str {
        "classifier"
    }
}

//! Speech collaborator traits
//!
//! Audio capture, transcription and synthesis live outside the dialogue core.
//! The core only sees text.

use async_trait::async_trait;

use crate::Result;

/// Source of user utterances
///
/// # Example
///
/// ```ignore
/// while let Some(utterance) = input.next_utterance().await? {
///     let result = session.process(&utterance).await;
///     output.speak(&result.text).await?;
/// }
/// ```
#[async_trait]
pub trait SpeechInput: Send {
    /// Wait for the next utterance
    ///
    /// Returns `Ok(None)` when no utterance was produced (timeout or
    /// unintelligible audio). Implementations lower-case the text.
    async fn next_utterance(&mut self) -> Result<Option<String>>;
}

/// Sink for assistant speech
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak the given text
    ///
    /// Callers are responsible for removing content that must not be spoken
    /// (fenced code blocks).
    async fn speak(&self, text: &str) -> Result<()>;

    /// Name for logging
    fn name(&self) -> &str;
}

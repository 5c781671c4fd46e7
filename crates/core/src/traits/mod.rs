//! Core traits for the voice assistant
//!
//! Collaborators at the edges of the dialogue engine are traits so they can be
//! swapped (or mocked in tests) without touching the state machine.
//!
//! ```text
//! Speech:
//!   - SpeechInput: yields one normalized utterance per turn
//!   - SpeechOutput: speaks assistant text
//!
//! Text Processing:
//!   - ConfirmationClassifier: yes/no interpretation of a free-form reply
//! ```

mod speech;
mod text_processing;

pub use speech::{SpeechInput, SpeechOutput};
pub use text_processing::{ConfirmationClassifier, ConfirmationIntent};

//! Spoken-text processing for the voice assistant
//!
//! This crate provides the text utilities the dialogue engine runs locally:
//! - **Entities**: spoken-email normalization, email and phone extraction
//! - **Intent**: keyword confirmation classifier, offline commands
//! - **Speech**: code-fence stripping before text is spoken

pub mod entities;
pub mod intent;
pub mod speech;

pub use entities::{
    extract_email, extract_phone_number, is_valid_email, lenient_email, normalize_spoken_email,
};
pub use intent::{KeywordConfirmationClassifier, OfflineCommand};
pub use speech::{strip_code_blocks, SpokenText};

//! Core traits and types for the voice assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation turns
//! - Completion request/response and function schema types
//! - Error taxonomy shared by the dialogue engine
//! - Collaborator traits (speech, confirmation classifier)

pub mod conversation;
pub mod error;
pub mod llm_types;
pub mod traits;

pub use conversation::{Turn, TurnRole};
pub use error::{Error, Result, ValidationError};
pub use llm_types::{
    argument_str, is_present, ChatMessage, Choice, CompletionRequest, CompletionResponse,
    FunctionArguments, FunctionCall, FunctionCallPolicy, FunctionSchema, FunctionSchemaBuilder,
    ParameterSpec, ResponseMessage,
};
pub use traits::{ConfirmationClassifier, ConfirmationIntent, SpeechInput, SpeechOutput};

//! Function-call extraction
//!
//! Classifies the first choice of a completion as a plain reply or a request
//! to call a declared function.

use serde_json::Value;
use voice_assistant_core::{CompletionResponse, FunctionArguments};

use crate::LlmError;

/// What the model asked for
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// Text to show the user
    PlainReply(String),
    /// Function the model wants called, with its raw argument text
    FunctionCallRequest { name: String, raw_arguments: String },
}

impl CompletionOutcome {
    /// Parsed arguments of a function-call request; empty for plain replies
    pub fn arguments(&self) -> FunctionArguments {
        match self {
            CompletionOutcome::FunctionCallRequest { raw_arguments, .. } => parse_arguments(raw_arguments),
            CompletionOutcome::PlainReply(_) => FunctionArguments::new(),
        }
    }
}

/// Inspect `choices[0].message` of a response
pub fn extract(response: &CompletionResponse) -> Result<CompletionOutcome, LlmError> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

    match &choice.message.function_call {
        Some(call) => Ok(CompletionOutcome::FunctionCallRequest {
            name: call.name.clone(),
            raw_arguments: call.arguments.clone(),
        }),
        None => Ok(CompletionOutcome::PlainReply(
            choice.message.content.clone().unwrap_or_default(),
        )),
    }
}

/// Parse raw argument text as a JSON object
///
/// Anything that is not a JSON object yields an empty argument set; slot
/// filling then asks for every required field.
pub fn parse_arguments(raw: &str) -> FunctionArguments {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Function arguments are not an object");
            FunctionArguments::new()
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse function arguments");
            FunctionArguments::new()
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

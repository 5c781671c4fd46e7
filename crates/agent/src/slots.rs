//! Slot filling for function calls with missing arguments
//!
//! Missing required arguments are asked for one at a time, in the order the
//! function schema declares them. Replies are taken verbatim as the value of
//! the field that was asked for; the completion service is not consulted.

use serde_json::Value;
use voice_assistant_core::{FunctionArguments, FunctionSchema};
use voice_assistant_text_processing::{extract_email, extract_phone_number};

/// A function call waiting for required arguments
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFunctionCall {
    /// Function the model asked for
    pub function: String,
    /// Arguments collected so far
    pub arguments: FunctionArguments,
    /// Fields still to ask for; the first one is asked next
    pub missing: Vec<String>,
}

impl PendingFunctionCall {
    /// Start from the model's arguments; missing fields follow schema order
    pub fn new(function: impl Into<String>, arguments: FunctionArguments, schema: &FunctionSchema) -> Self {
        let missing = schema.missing_required(&arguments);
        Self {
            function: function.into(),
            arguments,
            missing,
        }
    }

    /// Re-ask for one field even though it holds a value
    pub fn requiring(function: impl Into<String>, arguments: FunctionArguments, field: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            arguments,
            missing: vec![field.into()],
        }
    }

    /// Field to ask for next
    pub fn next_field(&self) -> Option<&str> {
        self.missing.first().map(String::as_str)
    }

    /// Merge a value for `field` and recompute what is still missing
    pub fn fill(&mut self, field: &str, value: String, schema: &FunctionSchema) {
        self.arguments.insert(field.to_string(), Value::String(value));
        self.missing.retain(|m| m != field);
        for name in schema.missing_required(&self.arguments) {
            if !self.missing.contains(&name) {
                self.missing.push(name);
            }
        }
    }
}

/// Value for `field` taken from a slot reply
///
/// Email and phone fields pull the matching token out of a longer reply;
/// everything else is the trimmed reply. Blank replies give `None`.
pub fn slot_value(field: &str, utterance: &str) -> Option<String> {
    let trimmed = utterance.trim();
    if trimmed.is_empty() {
        return None;
    }

    let extracted = match field {
        "email" => extract_email(trimmed),
        "contact_number" => extract_phone_number(trimmed),
        _ => None,
    };

    Some(extracted.unwrap_or_else(|| trimmed.to_string()))
}

/// Prompt asking for a missing field
pub fn missing_field_prompt(schema: &FunctionSchema, field: &str) -> String {
    format!(
        "Please provide the following information to proceed:\n- {}",
        schema.field_description(field)
    )
}

/// Prompt asking to replace a value that failed validation
pub fn invalid_field_prompt(field: &str, value: &str) -> String {
    let label = field.replace('_', " ");
    format!(
        "The {label} **{value}** seems invalid. Please provide a valid {label}.",
        label = label,
        value = value
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FunctionSchema {
        FunctionSchema::builder("CreateTicket", "Creates a support ticket")
            .param("name", "string", "The name of the user.", true)
            .param("email", "string", "The user's email address.", true)
            .param("issue", "string", "Description of the issue.", true)
            .param("contact_number", "string", "The user's contact number (optional).", false)
            .build()
    }

    #[test]
    fn test_first_missing_field_in_declared_order() {
        let mut args = FunctionArguments::new();
        args.insert("name".into(), json!("John"));
        let pending = PendingFunctionCall::new("CreateTicket", args, &schema());
        assert_eq!(pending.next_field(), Some("email"));
        assert_eq!(pending.missing, vec!["email", "issue"]);
        assert_eq!(
            missing_field_prompt(&schema(), "email"),
            "Please provide the following information to proceed:\n- Email: The user's email address."
        );
    }

    #[test]
    fn test_fill_advances() {
        let schema = schema();
        let mut pending = PendingFunctionCall::new("CreateTicket", FunctionArguments::new(), &schema);
        pending.fill("name", "John".into(), &schema);
        assert_eq!(pending.next_field(), Some("email"));
        pending.fill("email", "john@example.com".into(), &schema);
        pending.fill("issue", "printer jam".into(), &schema);
        assert_eq!(pending.next_field(), None);
        assert_eq!(pending.arguments["email"], json!("john@example.com"));
    }

    #[test]
    fn test_requiring_present_field() {
        let schema = schema();
        let mut args = FunctionArguments::new();
        args.insert("name".into(), json!("John"));
        args.insert("email".into(), json!("old@example.com"));
        args.insert("issue".into(), json!("printer jam"));

        let mut pending = PendingFunctionCall::requiring("CreateTicket", args, "email");
        assert_eq!(pending.next_field(), Some("email"));
        pending.fill("email", "new@example.com".into(), &schema);
        assert_eq!(pending.next_field(), None);
        assert_eq!(pending.arguments["email"], json!("new@example.com"));
    }

    #[test]
    fn test_slot_value() {
        assert_eq!(slot_value("name", "  John Smith "), Some("John Smith".into()));
        assert_eq!(slot_value("name", "   "), None);
        assert_eq!(
            slot_value("email", "it's jane at example dot com"),
            Some("jane@example.com".into())
        );
        // No address found: the raw reply is kept and validated later
        assert_eq!(slot_value("email", "jane"), Some("jane".into()));
        assert_eq!(slot_value("contact_number", "call me on 555-123-4567"), Some("555-123-4567".into()));
    }

    #[test]
    fn test_invalid_field_prompt() {
        assert_eq!(
            invalid_field_prompt("email", "jane"),
            "The email **jane** seems invalid. Please provide a valid email."
        );
        assert_eq!(
            invalid_field_prompt("contact_number", "12"),
            "The contact number **12** seems invalid. Please provide a valid contact number."
        );
    }
}

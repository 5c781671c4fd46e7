//! Completion request/response types
//!
//! Provider-independent shapes for chat completions with function calling.
//! The HTTP backends in the llm crate map these onto their wire formats.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::conversation::{Turn, TurnRole};

/// Arguments for a function call, keyed by parameter name.
pub type FunctionArguments = Map<String, Value>;

/// Returns true when an argument value counts as supplied.
///
/// `null`, empty strings and whitespace-only strings are treated as absent.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Get an argument as a trimmed string, if present
pub fn argument_str<'a>(args: &'a FunctionArguments, name: &str) -> Option<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Declared parameter of a function schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
}

impl ParameterSpec {
    /// Human-readable label, e.g. `contact_number` -> `Contact number`
    pub fn label(&self) -> String {
        let spaced = self.name.replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
            None => String::new(),
        }
    }
}

/// Function declaration offered to the completion service
///
/// Parameters keep their declaration order; slot-filling asks for missing
/// fields in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    pub required: Vec<String>,
}

impl FunctionSchema {
    /// Start building a schema
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> FunctionSchemaBuilder {
        FunctionSchemaBuilder::new(name, description)
    }

    /// Look up a declared parameter
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Check if a parameter is declared
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }

    /// Check if a parameter is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Required parameters not present in `args`, in declaration order
    pub fn missing_required(&self, args: &FunctionArguments) -> Vec<String> {
        self.parameters
            .iter()
            .filter(|p| self.is_required(&p.name))
            .filter(|p| !is_present(args.get(&p.name)))
            .map(|p| p.name.clone())
            .collect()
    }

    /// Prompt line describing a parameter, e.g. `Email: The user's email address.`
    pub fn field_description(&self, name: &str) -> String {
        match self.parameter(name) {
            Some(spec) => format!("{}: {}", spec.label(), spec.description),
            None => name.to_string(),
        }
    }

    /// JSON Schema form used by OpenAI-compatible `functions` arrays
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.param_type,
                        "description": p.description,
                    }),
                )
            })
            .collect();

        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": self.required,
            }
        })
    }
}

/// Builder for [`FunctionSchema`]
///
/// # Example
/// ```
/// use voice_assistant_core::FunctionSchema;
///
/// let schema = FunctionSchema::builder("CreateTicket", "Creates a support ticket")
///     .param("name", "string", "The name of the user.", true)
///     .param("contact_number", "string", "Optional phone number.", false)
///     .build();
/// assert_eq!(schema.required, vec!["name".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FunctionSchemaBuilder {
    name: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    required: Vec<String>,
}

impl FunctionSchemaBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Add a parameter with type and description
    pub fn param(
        mut self,
        name: impl Into<String>,
        param_type: &str,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required {
            self.required.push(name.clone());
        }
        self.parameters.push(ParameterSpec {
            name,
            param_type: param_type.to_string(),
            description: description.into(),
        });
        self
    }

    pub fn build(self) -> FunctionSchema {
        FunctionSchema {
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            required: self.required,
        }
    }
}

/// Whether the model may call a function for this request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCallPolicy {
    #[default]
    Auto,
    None,
}

impl FunctionCallPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionCallPolicy::Auto => "auto",
            FunctionCallPolicy::None => "none",
        }
    }
}

/// Chat message sent to the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: TurnRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier (empty means the backend default)
    pub model: String,
    /// Conversation replayed in order
    pub messages: Vec<ChatMessage>,
    /// Declared functions
    pub functions: Vec<FunctionSchema>,
    /// Function-call policy
    pub function_call: FunctionCallPolicy,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: String::new(),
            messages,
            functions: Vec::new(),
            function_call: FunctionCallPolicy::Auto,
            temperature: 0.5,
            max_tokens: 300,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_functions(mut self, functions: Vec<FunctionSchema>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_function_call(mut self, policy: FunctionCallPolicy) -> Self {
        self.function_call = policy;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
}

impl CompletionResponse {
    /// Convenience constructor for a plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ResponseMessage {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                    function_call: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
        }
    }

    /// Convenience constructor for a function-call reply
    pub fn function_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ResponseMessage {
                    role: Some("assistant".to_string()),
                    content: None,
                    function_call: Some(FunctionCall {
                        name: name.into(),
                        arguments: arguments.into(),
                    }),
                },
                finish_reason: Some("function_call".to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
}

/// Function call directive returned by the model
///
/// `arguments` is the raw text the model produced; it is usually, but not
/// always, a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default = "empty_arguments")]
    pub arguments: String,
}

fn empty_arguments() -> String {
    "{}".to_string()
}

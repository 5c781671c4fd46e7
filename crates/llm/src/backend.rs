//! Completion backends
//!
//! `CompletionBackend` performs exactly one request. Retry and backoff live in
//! [`crate::requester`], so a backend reports each failure as it happened.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use voice_assistant_core::{Choice, CompletionRequest, CompletionResponse};

use crate::LlmError;

/// Single-shot chat completion
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one completion request
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when a request does not name one
    fn model_name(&self) -> &str;
}

/// Configuration for OpenAI-compatible backends
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API endpoint (OpenAI: https://api.openai.com/v1)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Default model name
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
    /// Organization ID (OpenAI specific)
    pub organization: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(10),
            organization: None,
        }
    }
}

impl OpenAIConfig {
    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Build from loaded settings plus the resolved credential
    pub fn from_settings(llm: &voice_assistant_config::LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: llm.endpoint.clone(),
            api_key: api_key.into(),
            model: llm.model.clone(),
            timeout: Duration::from_secs(llm.timeout_secs),
            organization: None,
        }
    }
}

/// OpenAI-compatible backend using the `functions` / `function_call` fields
pub struct OpenAIBackend {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new OpenAI backend
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() && !config.endpoint.starts_with("http://localhost") {
            return Err(LlmError::Configuration("API key required for remote endpoints".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        if let Ok(val) = HeaderValue::from_str(&auth_value) {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        if let Some(ref org) = self.config.organization {
            if let Ok(val) = HeaderValue::from_str(org) {
                headers.insert("OpenAI-Organization", val);
            }
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }

    fn wire_request(&self, request: &CompletionRequest) -> OpenAIChatRequest {
        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        // function_call is only accepted alongside a functions array
        let (functions, function_call) = if request.functions.is_empty() {
            (None, None)
        } else {
            (
                Some(request.functions.iter().map(|f| f.to_json()).collect()),
                Some(request.function_call.as_str()),
            )
        };

        OpenAIChatRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str(),
                    content: m.content.clone(),
                })
                .collect(),
            functions,
            function_call,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            n: 1,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAIBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let wire = self.wire_request(request);

        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(&wire)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            // 429 and 5xx are transient, other 4xx are not
            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited(message));
            }
            if status.is_server_error() {
                return Err(LlmError::ServerError {
                    status: status.as_u16(),
                    message,
                });
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: OpenAIChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion token usage"
            );
        }

        Ok(CompletionResponse {
            choices: parsed.choices,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<&'static str>,
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

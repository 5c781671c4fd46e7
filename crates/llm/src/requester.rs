//! Completion requester with exponential-backoff retry
//!
//! The requester never sees the turn log itself, only the messages built
//! from it, so retries cannot duplicate a user turn.

use std::sync::Arc;
use std::time::{Duration, Instant};

use voice_assistant_config::LlmConfig;
use voice_assistant_core::{
    ChatMessage, CompletionRequest, CompletionResponse, FunctionCallPolicy, FunctionSchema,
};

use crate::backend::CompletionBackend;
use crate::LlmError;

/// Retry schedule for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        }
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Per-request overrides of the configured sampling defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl RequestOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Sends conversation + function schemas to a [`CompletionBackend`]
#[derive(Clone)]
pub struct CompletionRequester {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl CompletionRequester {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &LlmConfig) -> Self {
        Self {
            backend,
            retry: RetryPolicy::from_config(config),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Replace the retry schedule
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn model_name(&self) -> &str {
        if self.model.is_empty() {
            self.backend.model_name()
        } else {
            &self.model
        }
    }

    /// Build the request with configured defaults and the given overrides
    pub fn build_request(
        &self,
        messages: Vec<ChatMessage>,
        functions: &[FunctionSchema],
        policy: FunctionCallPolicy,
        options: RequestOptions,
    ) -> CompletionRequest {
        CompletionRequest::new(messages)
            .with_model(self.model.clone())
            .with_functions(functions.to_vec())
            .with_function_call(policy)
            .with_temperature(options.temperature.unwrap_or(self.temperature))
            .with_max_tokens(options.max_tokens.unwrap_or(self.max_tokens))
    }

    /// Request a completion, retrying transient failures
    pub async fn request(
        &self,
        messages: Vec<ChatMessage>,
        functions: &[FunctionSchema],
        policy: FunctionCallPolicy,
        options: RequestOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let request = self.build_request(messages, functions, policy, options);
        self.send(&request).await
    }

    /// Send a prepared request, retrying transient failures
    pub async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let start = Instant::now();
        let mut last_error = None;
        let mut backoff = self.retry.initial_backoff;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "Completion request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.retry.max_retries
                );
                metrics::counter!("llm_retries_total").increment(1);
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.attempt(request).await {
                Ok(response) => {
                    metrics::counter!("llm_requests_total", "status" => "success").increment(1);
                    metrics::histogram!("llm_request_duration_seconds")
                        .record(start.elapsed().as_secs_f64());
                    return Ok(response);
                },
                Err(e) if e.is_retryable() => {
                    tracing::debug!(error = %e, attempt, "Transient completion failure");
                    last_error = Some(e);
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Completion request failed without retry");
                    metrics::counter!("llm_requests_total", "status" => "error").increment(1);
                    return Err(e);
                },
            }
        }

        metrics::counter!("llm_requests_total", "status" => "exhausted").increment(1);
        let last = last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string()));
        tracing::error!(error = %last, attempts = self.retry.max_attempts(), "Completion retries exhausted");
        Err(LlmError::Exhausted {
            attempts: self.retry.max_attempts(),
            last: Box::new(last),
        })
    }

    /// One attempt: call the backend and reject responses without choices
    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self.backend.complete(request).await?;
        if response.choices.is_empty() {
            return Err(LlmError::InvalidResponse("No choices in response".to_string()));
        }
        Ok(response)
    }
}

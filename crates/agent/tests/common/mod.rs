//! Shared fixtures for dialogue tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use voice_assistant_agent::{AgentConfig, DialogueServices, DialogueSession};
use voice_assistant_config::LlmConfig;
use voice_assistant_core::{CompletionRequest, CompletionResponse};
use voice_assistant_llm::{CompletionBackend, CompletionRequester, LlmError, RetryPolicy};
use voice_assistant_text_processing::KeywordConfirmationClassifier;
use voice_assistant_tools::{
    create_default_registry, IntegrationError, TicketRequest, TicketingIntegration,
};

/// Backend replaying a fixed script and recording every request
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<CompletionResponse, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, outcome: Result<CompletionResponse, LlmError>) {
        self.script.lock().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().push(request.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Network("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Ticketing integration that records tickets and can be told to fail
#[derive(Default)]
pub struct RecordingIntegration {
    tickets: Mutex<Vec<TicketRequest>>,
    failures: Mutex<VecDeque<IntegrationError>>,
}

impl RecordingIntegration {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next ticket with `error`
    pub fn fail_next(&self, error: IntegrationError) {
        self.failures.lock().push_back(error);
    }

    pub fn tickets(&self) -> Vec<TicketRequest> {
        self.tickets.lock().clone()
    }
}

#[async_trait]
impl TicketingIntegration for RecordingIntegration {
    async fn create_ticket(&self, ticket: TicketRequest) -> Result<String, IntegrationError> {
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        let mut tickets = self.tickets.lock();
        tickets.push(ticket);
        Ok(format!("TKT-{:08}", tickets.len()))
    }
}

pub struct Harness {
    pub session: DialogueSession,
    pub backend: Arc<ScriptedBackend>,
    pub integration: Arc<RecordingIntegration>,
}

/// Session with the finished check disabled
pub fn harness(script: Vec<Result<CompletionResponse, LlmError>>) -> Harness {
    harness_with(script, AgentConfig::default().with_finished_check(false))
}

pub fn harness_with(script: Vec<Result<CompletionResponse, LlmError>>, config: AgentConfig) -> Harness {
    let backend = ScriptedBackend::new(script);
    let integration = RecordingIntegration::new();

    let requester = CompletionRequester::new(backend.clone(), &LlmConfig::default())
        .with_retry_policy(RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
        });
    let services = DialogueServices::new(
        requester,
        Arc::new(create_default_registry(integration.clone())),
        Arc::new(KeywordConfirmationClassifier::new()),
    );

    Harness {
        session: DialogueSession::new("test-session", config, services),
        backend,
        integration,
    }
}

/// Model reply asking to create a ticket with the given JSON arguments
pub fn create_ticket(arguments: &str) -> Result<CompletionResponse, LlmError> {
    Ok(CompletionResponse::function_call("CreateTicket", arguments))
}

pub fn reply(text: &str) -> Result<CompletionResponse, LlmError> {
    Ok(CompletionResponse::text(text))
}

//! Dialogue session
//!
//! One session per conversation. Every utterance is appended to the turn
//! log once, then handled according to the current [`DialogueState`]:
//!
//! ```text
//! Idle         --function call, fields missing-->  SlotFilling
//! Idle         --function call, all present----->  Confirming
//! SlotFilling  --last field filled-------------->  Confirming
//! Confirming   --"no"--------------------------->  SlotFilling (email)
//! Confirming   --"yes", dispatch ok------------->  Idle (session reset)
//! Confirming   --"yes", dispatch failed--------->  SlotFilling (email)
//! ```
//!
//! Only the idle state talks to the completion service. Errors never
//! escape [`DialogueSession::process`]; they become the reply text.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use voice_assistant_core::{
    argument_str, ConfirmationClassifier, Error, FunctionArguments, FunctionCallPolicy,
    FunctionSchema, ValidationError,
};
use voice_assistant_config::Settings;
use voice_assistant_llm::{
    extract, parse_arguments, CompletionBackend, CompletionOutcome, CompletionRequester,
    OpenAIBackend, OpenAIConfig, RequestOptions,
};
use voice_assistant_text_processing::{lenient_email, KeywordConfirmationClassifier};
use voice_assistant_tools::{create_default_registry, ActionRegistry, StubTicketingIntegration};

use crate::agent_config::AgentConfig;
use crate::confirmation::{
    correction_prompt, ConfirmationEngine, ConfirmationState, ConfirmationStep, DENIED_PROMPT,
};
use crate::dispatch::{DispatchOutcome, FunctionDispatcher};
use crate::finished::FinishedDetector;
use crate::slots::{invalid_field_prompt, missing_field_prompt, slot_value, PendingFunctionCall};
use crate::turn_log::TurnLog;
use crate::AgentError;

/// Where the session is in the dialogue
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogueState {
    /// Free conversation with the model
    #[default]
    Idle,
    /// Collecting missing arguments for a function call
    SlotFilling(PendingFunctionCall),
    /// Waiting for the user to confirm an argument
    Confirming(ConfirmationState),
}

impl DialogueState {
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::SlotFilling(_) => "slot_filling",
            DialogueState::Confirming(_) => "confirming",
        }
    }
}

/// Reply to one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueResult {
    /// Assistant text to display and speak
    pub text: String,
    /// The model judged the conversation complete
    pub finished: bool,
}

impl DialogueResult {
    fn new(text: impl Into<String>, finished: bool) -> Self {
        Self {
            text: text.into(),
            finished,
        }
    }
}

/// Collaborators shared by every session
#[derive(Clone)]
pub struct DialogueServices {
    pub requester: CompletionRequester,
    pub registry: Arc<ActionRegistry>,
    pub classifier: Arc<dyn ConfirmationClassifier>,
}

impl DialogueServices {
    pub fn new(
        requester: CompletionRequester,
        registry: Arc<ActionRegistry>,
        classifier: Arc<dyn ConfirmationClassifier>,
    ) -> Self {
        Self {
            requester,
            registry,
            classifier,
        }
    }

    /// OpenAI-compatible backend with the credential from the environment
    pub fn from_settings(settings: &Settings) -> Result<Self, AgentError> {
        let api_key = settings.api_key()?;
        let backend = OpenAIBackend::new(OpenAIConfig::from_settings(&settings.llm, api_key))?;
        Ok(Self::with_backend(settings, Arc::new(backend)))
    }

    /// Default registry and keyword classifier around the given backend
    pub fn with_backend(settings: &Settings, backend: Arc<dyn CompletionBackend>) -> Self {
        let registry = create_default_registry(Arc::new(StubTicketingIntegration::new()));
        Self::new(
            CompletionRequester::new(backend, &settings.llm),
            Arc::new(registry),
            Arc::new(KeywordConfirmationClassifier::new()),
        )
    }
}

/// How a handled utterance ended
enum TurnOutcome {
    /// Model reply; followed by the finished check
    Reply(String),
    /// Locally generated prompt
    Prompt(String),
    /// Function dispatched; the session starts over
    Completed(String),
}

impl TurnOutcome {
    fn name(&self) -> &'static str {
        match self {
            TurnOutcome::Reply(_) => "reply",
            TurnOutcome::Prompt(_) => "prompt",
            TurnOutcome::Completed(_) => "completed",
        }
    }
}

/// A single conversation
pub struct DialogueSession {
    id: String,
    config: AgentConfig,
    log: TurnLog,
    state: DialogueState,
    requester: CompletionRequester,
    dispatcher: FunctionDispatcher,
    confirmation: ConfirmationEngine,
    finished: FinishedDetector,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl DialogueSession {
    pub fn new(id: impl Into<String>, config: AgentConfig, services: DialogueServices) -> Self {
        let id = id.into();
        let now = Utc::now();

        tracing::info!(
            session_id = %id,
            max_turns = config.max_turns,
            model = services.requester.model_name(),
            "Dialogue session created"
        );

        Self {
            log: TurnLog::new(config.max_turns),
            finished: FinishedDetector::new(services.requester.clone()),
            dispatcher: FunctionDispatcher::new(services.registry),
            confirmation: ConfirmationEngine::new(services.classifier),
            requester: services.requester,
            state: DialogueState::Idle,
            id,
            config,
            created_at: now,
            last_activity: now,
        }
    }

    /// Handle one user utterance
    pub async fn process(&mut self, utterance: &str) -> DialogueResult {
        self.last_activity = Utc::now();
        self.log.push_user(utterance);

        let state = std::mem::take(&mut self.state);
        tracing::debug!(session_id = %self.id, state = state.name(), "Processing utterance");

        let outcome = match state {
            DialogueState::Idle => self.converse().await,
            DialogueState::SlotFilling(pending) => Ok(self.fill_slot(pending, utterance).await),
            DialogueState::Confirming(confirming) => Ok(self.confirm(confirming, utterance).await),
        };

        let label = outcome.as_ref().map_or("error", TurnOutcome::name);
        metrics::counter!("dialogue_turns_total", "outcome" => label).increment(1);

        match outcome {
            Ok(TurnOutcome::Reply(text)) => {
                self.log.push_assistant(text.as_str());
                let finished = self.config.finished_check
                    && self
                        .finished
                        .is_finished(&self.log, &self.dispatcher.registry().schemas())
                        .await;
                DialogueResult::new(text, finished)
            },
            Ok(TurnOutcome::Prompt(text)) => {
                self.log.push_assistant(text.as_str());
                DialogueResult::new(text, false)
            },
            Ok(TurnOutcome::Completed(text)) => {
                self.reset();
                DialogueResult::new(text, false)
            },
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Turn failed");
                DialogueResult::new(e.user_message(), false)
            },
        }
    }

    /// Clear the turn log and any pending call
    pub fn reset(&mut self) {
        tracing::info!(session_id = %self.id, turns = self.log.len(), "Dialogue session reset");
        self.log.reset();
        self.state = DialogueState::Idle;
    }

    /// End the session
    pub fn destroy(self) {
        tracing::info!(
            session_id = %self.id,
            turns = self.log.len(),
            state = self.state.name(),
            "Dialogue session destroyed"
        );
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn turn_count(&self) -> usize {
        self.log.len()
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn turn_log(&self) -> &TurnLog {
        &self.log
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    async fn converse(&mut self) -> Result<TurnOutcome, Error> {
        let functions = self.dispatcher.registry().schemas();
        let response = self
            .requester
            .request(
                self.log.messages(),
                &functions,
                FunctionCallPolicy::Auto,
                RequestOptions::default(),
            )
            .await?;

        match extract(&response)? {
            CompletionOutcome::PlainReply(text) => Ok(TurnOutcome::Reply(text)),
            CompletionOutcome::FunctionCallRequest { name, raw_arguments } => {
                tracing::info!(session_id = %self.id, function = %name, "Function call requested");
                Ok(self.start_call(name, parse_arguments(&raw_arguments)).await)
            },
        }
    }

    async fn start_call(&mut self, function: String, arguments: FunctionArguments) -> TurnOutcome {
        let Some(schema) = self.schema(&function) else {
            tracing::warn!(session_id = %self.id, function = %function, "Unknown function requested");
            return TurnOutcome::Prompt(Error::UnknownFunction(function).user_message());
        };

        let pending = PendingFunctionCall::new(function, arguments, &schema);
        self.advance(pending, &schema).await
    }

    async fn fill_slot(&mut self, mut pending: PendingFunctionCall, utterance: &str) -> TurnOutcome {
        let Some(schema) = self.schema(&pending.function) else {
            return TurnOutcome::Prompt(Error::UnknownFunction(pending.function).user_message());
        };

        let Some(field) = pending.next_field().map(str::to_string) else {
            return self.advance(pending, &schema).await;
        };

        match slot_value(&field, utterance) {
            Some(value) => {
                tracing::debug!(session_id = %self.id, field = %field, "Slot filled");
                pending.fill(&field, value, &schema);
                self.advance(pending, &schema).await
            },
            None => {
                let prompt = missing_field_prompt(&schema, &field);
                self.state = DialogueState::SlotFilling(pending);
                TurnOutcome::Prompt(prompt)
            },
        }
    }

    /// Ask for the next missing field, or move on to validation
    async fn advance(&mut self, pending: PendingFunctionCall, schema: &FunctionSchema) -> TurnOutcome {
        if let Some(field) = pending.next_field() {
            tracing::info!(
                session_id = %self.id,
                function = %pending.function,
                field,
                "Requesting missing argument"
            );
            let prompt = missing_field_prompt(schema, field);
            self.state = DialogueState::SlotFilling(pending);
            return TurnOutcome::Prompt(prompt);
        }

        let PendingFunctionCall {
            function,
            mut arguments,
            ..
        } = pending;

        if !schema.has_parameter(&self.config.confirm_field) {
            if let Err(err) = self.validate(&function, &mut arguments, schema) {
                return self.reject(function, arguments, &err.field);
            }
            return self.dispatch(function, arguments).await;
        }

        let field = self.config.confirm_field.clone();
        let raw = argument_str(&arguments, &field).unwrap_or_default().to_string();
        match lenient_email(&raw) {
            Some(normalized) => {
                arguments.insert(field.clone(), Value::String(normalized));
            },
            None => return self.reject(function, arguments, &field),
        }

        if let Err(err) = self.validate(&function, &mut arguments, schema) {
            return self.reject(function, arguments, &err.field);
        }

        let confirming = ConfirmationState::new(function, arguments, field);
        tracing::info!(
            session_id = %self.id,
            function = %confirming.function,
            field = %confirming.field,
            "Awaiting confirmation"
        );
        let prompt = confirming.prompt();
        self.state = DialogueState::Confirming(confirming);
        TurnOutcome::Prompt(prompt)
    }

    async fn confirm(&mut self, confirming: ConfirmationState, utterance: &str) -> TurnOutcome {
        match self.confirmation.handle(confirming, utterance) {
            ConfirmationStep::Corrected(confirming) => {
                let prompt = correction_prompt(confirming.value());
                self.state = DialogueState::Confirming(confirming);
                TurnOutcome::Prompt(prompt)
            },
            ConfirmationStep::Unclear(confirming) => {
                let prompt = confirming.prompt();
                self.state = DialogueState::Confirming(confirming);
                TurnOutcome::Prompt(prompt)
            },
            ConfirmationStep::Denied(pending) => {
                self.state = DialogueState::SlotFilling(pending);
                TurnOutcome::Prompt(DENIED_PROMPT.to_string())
            },
            ConfirmationStep::Confirmed(confirming) => {
                self.dispatch(confirming.function, confirming.arguments).await
            },
        }
    }

    async fn dispatch(&mut self, function: String, arguments: FunctionArguments) -> TurnOutcome {
        match self.dispatcher.dispatch(&function, arguments.clone()).await {
            DispatchOutcome::Success { message, .. } => TurnOutcome::Completed(message),
            DispatchOutcome::Failed { message, .. } => {
                // Arguments survive; the confirmable field must be confirmed again
                let confirm_field = self.config.confirm_field.clone();
                let reconfirm = self
                    .schema(&function)
                    .is_some_and(|s| s.has_parameter(&confirm_field));
                if reconfirm {
                    self.state = DialogueState::SlotFilling(PendingFunctionCall::requiring(
                        function,
                        arguments,
                        confirm_field,
                    ));
                }
                TurnOutcome::Prompt(message)
            },
            DispatchOutcome::Invalid(err) => self.reject(function, arguments, &err.field),
            DispatchOutcome::UnknownFunction { message } => TurnOutcome::Prompt(message),
        }
    }

    /// Re-ask for a field whose value failed validation
    fn reject(&mut self, function: String, arguments: FunctionArguments, field: &str) -> TurnOutcome {
        let value = argument_str(&arguments, field).unwrap_or_default().to_string();
        tracing::info!(session_id = %self.id, function = %function, field, "Argument rejected");
        self.state = DialogueState::SlotFilling(PendingFunctionCall::requiring(function, arguments, field));
        TurnOutcome::Prompt(invalid_field_prompt(field, &value))
    }

    /// Validate the arguments, dropping optional ones the action rejects
    ///
    /// Only a rejected required field is returned as an error.
    fn validate(
        &self,
        function: &str,
        arguments: &mut FunctionArguments,
        schema: &FunctionSchema,
    ) -> Result<(), ValidationError> {
        let Some(action) = self.dispatcher.registry().get(function) else {
            return Ok(());
        };

        loop {
            let err = match action.validate(arguments) {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            if schema.is_required(&err.field) || arguments.remove(&err.field).is_none() {
                return Err(err);
            }
            tracing::debug!(
                session_id = %self.id,
                function,
                field = %err.field,
                "Dropped invalid optional argument"
            );
        }
    }

    fn schema(&self, function: &str) -> Option<FunctionSchema> {
        self.dispatcher.registry().get(function).map(|action| action.schema())
    }
}

impl std::fmt::Debug for DialogueSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueSession")
            .field("id", &self.id)
            .field("state", &self.state.name())
            .field("turns", &self.log.len())
            .finish()
    }
}

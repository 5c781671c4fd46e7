//! Conversation-finished check
//!
//! After a plain reply the model is asked whether the conversation is over.

use voice_assistant_config::constants::dialogue::{FINISHED_MAX_TOKENS, FINISHED_QUESTION};
use voice_assistant_core::{ChatMessage, FunctionCallPolicy, FunctionSchema};
use voice_assistant_llm::{extract, CompletionOutcome, CompletionRequester, RequestOptions};

use crate::turn_log::TurnLog;

/// Asks the completion service whether the conversation is complete
#[derive(Clone)]
pub struct FinishedDetector {
    requester: CompletionRequester,
}

impl FinishedDetector {
    pub fn new(requester: CompletionRequester) -> Self {
        Self { requester }
    }

    /// True only when the model answers exactly "yes"
    ///
    /// Any failure counts as not finished. The meta-question is sent with
    /// the request only; it is never added to the log.
    pub async fn is_finished(&self, log: &TurnLog, functions: &[FunctionSchema]) -> bool {
        let mut messages = log.messages();
        messages.push(ChatMessage::user(FINISHED_QUESTION));

        let options = RequestOptions::default()
            .with_temperature(0.0)
            .with_max_tokens(FINISHED_MAX_TOKENS);

        let response = match self
            .requester
            .request(messages, functions, FunctionCallPolicy::None, options)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Finished check failed");
                return false;
            },
        };

        let finished = match extract(&response) {
            Ok(CompletionOutcome::PlainReply(answer)) => is_affirmative_answer(&answer),
            Ok(CompletionOutcome::FunctionCallRequest { name, .. }) => {
                tracing::debug!(function = %name, "Finished check answered with a function call");
                false
            },
            Err(e) => {
                tracing::warn!(error = %e, "Finished check returned no answer");
                false
            },
        };

        tracing::debug!(finished, "Finished check");
        finished
    }
}

/// Exact "yes" or "yes." after trimming and lower-casing
pub fn is_affirmative_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "yes.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answer() {
        assert!(is_affirmative_answer("yes"));
        assert!(is_affirmative_answer("  Yes. \n"));
        assert!(is_affirmative_answer("YES"));
        assert!(!is_affirmative_answer("yes, I think so"));
        assert!(!is_affirmative_answer("no"));
        assert!(!is_affirmative_answer(""));
        assert!(!is_affirmative_answer("yes!"));
    }
}

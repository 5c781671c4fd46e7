//! End-to-end dialogues against a scripted completion backend

mod common;

use common::{create_ticket, harness, harness_with, reply};
use serde_json::json;
use voice_assistant_agent::{AgentConfig, DialogueState};
use voice_assistant_config::constants::dialogue::FINISHED_QUESTION;
use voice_assistant_core::{CompletionResponse, FunctionCallPolicy, TurnRole};
use voice_assistant_llm::LlmError;
use voice_assistant_tools::IntegrationError;

const ASK_EMAIL: &str = "Please provide the following information to proceed:\n- Email: The user's email address.";
const ASK_ISSUE: &str = "Please provide the following information to proceed:\n- Issue: Description of the issue.";
const APOLOGY: &str = "I'm sorry, I'm having trouble reaching the assistant service right now. Please try again.";

const FULL_ARGS: &str = r#"{"name": "John", "email": "john@example.com", "issue": "printer jam"}"#;

fn confirm(email: &str) -> String {
    format!("Please confirm if the email **{}** is correct or provide a new email.", email)
}

#[tokio::test]
async fn test_first_prompt_asks_for_email() {
    let mut h = harness(vec![create_ticket(r#"{"name": "John"}"#)]);

    let result = h.session.process("I'm John and I need a ticket").await;
    assert_eq!(result.text, ASK_EMAIL);
    assert!(!result.finished);

    match h.session.state() {
        DialogueState::SlotFilling(pending) => {
            assert_eq!(pending.missing, vec!["email", "issue"]);
            assert_eq!(pending.arguments["name"], json!("John"));
        },
        other => panic!("expected slot filling, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_ticket_flow() {
    let mut h = harness(vec![create_ticket(r#"{"name": "John"}"#)]);

    assert_eq!(h.session.process("I'm John and I need a ticket").await.text, ASK_EMAIL);
    assert_eq!(h.session.process("john@example.com").await.text, ASK_ISSUE);
    assert_eq!(
        h.session.process("my printer is jammed").await.text,
        confirm("john@example.com")
    );

    let result = h.session.process("yes").await;
    assert_eq!(
        result.text,
        "Ticket created successfully with ID: TKT-00000001. Is there anything else I can help with?"
    );

    // Slot filling and confirmation never reach the completion service
    assert_eq!(h.backend.calls(), 1);

    let tickets = h.integration.tickets();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].name, "John");
    assert_eq!(tickets[0].email, "john@example.com");
    assert_eq!(tickets[0].issue, "my printer is jammed");
    assert_eq!(tickets[0].contact_number, None);

    // Success resets the session
    assert_eq!(h.session.turn_count(), 0);
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

#[tokio::test]
async fn test_denial_reopens_email() {
    let mut h = harness(vec![create_ticket(FULL_ARGS)]);

    assert_eq!(h.session.process("open a ticket please").await.text, confirm("john@example.com"));
    assert_eq!(
        h.session.process("no").await.text,
        "It seems like the email is incorrect. Please provide a new email address."
    );

    match h.session.state() {
        DialogueState::SlotFilling(pending) => {
            assert_eq!(pending.missing, vec!["email"]);
            assert_eq!(pending.arguments["issue"], json!("printer jam"));
        },
        other => panic!("expected slot filling, got {:?}", other),
    }

    assert_eq!(
        h.session.process("jane at example dot com").await.text,
        confirm("jane@example.com")
    );
    h.session.process("yes").await;

    let tickets = h.integration.tickets();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].email, "jane@example.com");
}

#[tokio::test]
async fn test_spoken_email_from_model_is_normalized() {
    let mut h = harness(vec![create_ticket(
        r#"{"name": "Jane", "email": "jane at example dot com", "issue": "no wifi"}"#,
    )]);

    assert_eq!(h.session.process("ticket please").await.text, confirm("jane@example.com"));
}

#[tokio::test]
async fn test_correction_during_confirmation() {
    let mut h = harness(vec![create_ticket(FULL_ARGS)]);
    h.session.process("open a ticket").await;

    let result = h.session.process("actually use jane@example.org").await;
    assert_eq!(
        result.text,
        "You provided a new email: **jane@example.org**. Is this correct? (yes/no)"
    );
    assert!(matches!(h.session.state(), DialogueState::Confirming(c) if c.value() == "jane@example.org"));

    h.session.process("yes").await;
    assert_eq!(h.integration.tickets()[0].email, "jane@example.org");
}

#[tokio::test]
async fn test_unclear_reply_repeats_question() {
    let mut h = harness(vec![create_ticket(FULL_ARGS)]);
    h.session.process("open a ticket").await;

    assert_eq!(h.session.process("hmm").await.text, confirm("john@example.com"));
    assert!(matches!(h.session.state(), DialogueState::Confirming(_)));
    assert!(h.integration.tickets().is_empty());
}

#[tokio::test]
async fn test_phone_folded_when_confirming() {
    let mut h = harness(vec![create_ticket(FULL_ARGS)]);
    h.session.process("open a ticket").await;

    h.session.process("yes, and call me at 123-456-7890").await;
    assert_eq!(
        h.integration.tickets()[0].contact_number.as_deref(),
        Some("123-456-7890")
    );
}

#[tokio::test]
async fn test_phone_folded_when_denying() {
    let mut h = harness(vec![create_ticket(FULL_ARGS)]);
    h.session.process("open a ticket").await;

    h.session.process("no, but my number is 123.456.7890").await;
    match h.session.state() {
        DialogueState::SlotFilling(pending) => {
            assert_eq!(pending.arguments["contact_number"], json!("123.456.7890"));
        },
        other => panic!("expected slot filling, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_email_is_reprompted() {
    let mut h = harness(vec![create_ticket(
        r#"{"name": "John", "email": "john", "issue": "printer jam"}"#,
    )]);

    assert_eq!(
        h.session.process("open a ticket").await.text,
        "The email **john** seems invalid. Please provide a valid email."
    );
    assert_eq!(
        h.session.process("it is john at example dot com").await.text,
        confirm("john@example.com")
    );
}

#[tokio::test]
async fn test_invalid_optional_contact_number_is_dropped() {
    let mut h = harness(vec![create_ticket(
        r#"{"name": "John", "email": "john@example.com", "issue": "printer jam", "contact_number": "555-1234"}"#,
    )]);

    assert_eq!(h.session.process("open a ticket").await.text, confirm("john@example.com"));
    match h.session.state() {
        DialogueState::Confirming(confirming) => {
            assert!(!confirming.arguments.contains_key("contact_number"));
        },
        other => panic!("expected confirmation, got {:?}", other),
    }

    let result = h.session.process("yes").await;
    assert!(result.text.starts_with("Ticket created successfully"));

    let tickets = h.integration.tickets();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].contact_number, None);
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

#[tokio::test]
async fn test_formatted_contact_number_is_kept() {
    let mut h = harness(vec![create_ticket(
        r#"{"name": "John", "email": "john@example.com", "issue": "printer jam", "contact_number": "(555) 123-4567"}"#,
    )]);

    assert_eq!(h.session.process("open a ticket").await.text, confirm("john@example.com"));
    h.session.process("yes").await;

    let tickets = h.integration.tickets();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].contact_number.as_deref(), Some("(555) 123-4567"));
}

#[tokio::test]
async fn test_blank_slot_reply_reprompts_same_field() {
    let mut h = harness(vec![create_ticket(r#"{"name": "John"}"#)]);
    h.session.process("ticket").await;

    assert_eq!(h.session.process("   ").await.text, ASK_EMAIL);
    assert!(matches!(h.session.state(), DialogueState::SlotFilling(p) if p.next_field() == Some("email")));
}

#[tokio::test]
async fn test_unparseable_arguments_ask_every_field() {
    let mut h = harness(vec![create_ticket("name=John")]);
    assert_eq!(
        h.session.process("ticket").await.text,
        "Please provide the following information to proceed:\n- Name: The name of the user."
    );
}

#[tokio::test]
async fn test_dispatch_failure_requires_reconfirmation() {
    let mut h = harness(vec![create_ticket(FULL_ARGS)]);
    h.integration
        .fail_next(IntegrationError::Internal("the helpdesk being offline".into()));

    h.session.process("open a ticket").await;
    let result = h.session.process("yes").await;
    assert_eq!(
        result.text,
        "I was unable to create the ticket due to the helpdesk being offline. \
         Please provide your email address again so I can retry."
    );
    assert!(h.session.turn_count() > 0);
    match h.session.state() {
        DialogueState::SlotFilling(pending) => {
            assert_eq!(pending.missing, vec!["email"]);
            assert_eq!(pending.arguments["name"], json!("John"));
        },
        other => panic!("expected slot filling, got {:?}", other),
    }

    assert_eq!(h.session.process("john@example.com").await.text, confirm("john@example.com"));
    h.session.process("yes").await;
    assert_eq!(h.integration.tickets().len(), 1);
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

#[tokio::test]
async fn test_unknown_function() {
    let mut h = harness(vec![Ok(CompletionResponse::function_call("ResetPassword", "{}"))]);

    let result = h.session.process("reset my password").await;
    assert_eq!(result.text, "Function 'ResetPassword' is not implemented.");
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

#[tokio::test]
async fn test_transient_failure_then_success() {
    let mut h = harness(vec![
        Err(LlmError::ServerError {
            status: 503,
            message: "overloaded".into(),
        }),
        reply("Hello! How can I help?"),
    ]);

    let result = h.session.process("hi there").await;
    assert_eq!(result.text, "Hello! How can I help?");
    assert_eq!(h.backend.calls(), 2);

    let user_turns: Vec<_> = h
        .session
        .turn_log()
        .turns()
        .filter(|t| t.role == TurnRole::User)
        .collect();
    assert_eq!(user_turns.len(), 1);
    assert_eq!(user_turns[0].content, "hi there");

    // Both attempts carried the same single user turn
    for request in h.backend.requests() {
        assert_eq!(request.messages.len(), 1);
    }
}

#[tokio::test]
async fn test_exhausted_retries_apologize_without_logging() {
    let mut h = harness(vec![
        Err(LlmError::Timeout),
        Err(LlmError::Timeout),
        Err(LlmError::Timeout),
    ]);

    let result = h.session.process("hello?").await;
    assert_eq!(result.text, APOLOGY);
    assert!(!result.finished);
    assert_eq!(h.backend.calls(), 3);
    assert_eq!(h.session.turn_count(), 1);
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let mut h = harness(vec![Err(LlmError::Api {
        status: 401,
        message: "bad key".into(),
    })]);

    assert_eq!(h.session.process("hello").await.text, APOLOGY);
    assert_eq!(h.backend.calls(), 1);
}

#[tokio::test]
async fn test_empty_choices_is_protocol_error() {
    let mut h = harness(vec![Ok(CompletionResponse { choices: vec![] })]);

    assert_eq!(h.session.process("hello").await.text, APOLOGY);
    assert_eq!(h.backend.calls(), 1);
}

#[tokio::test]
async fn test_finished_check_yes() {
    let mut h = harness_with(
        vec![reply("Glad I could help. Goodbye!"), reply("Yes.")],
        AgentConfig::default(),
    );

    let result = h.session.process("that's all, thanks").await;
    assert_eq!(result.text, "Glad I could help. Goodbye!");
    assert!(result.finished);

    let requests = h.backend.requests();
    let check = &requests[1];
    assert_eq!(check.function_call, FunctionCallPolicy::None);
    assert_eq!(check.temperature, 0.0);
    assert_eq!(check.max_tokens, 10);
    assert_eq!(check.messages.last().map(|m| m.content.as_str()), Some(FINISHED_QUESTION));

    // The meta-question is not part of the conversation
    assert_eq!(h.session.turn_count(), 2);
}

#[tokio::test]
async fn test_finished_check_requires_exact_yes() {
    let mut h = harness_with(
        vec![reply("Anything else?"), reply("yes, I think so")],
        AgentConfig::default(),
    );
    assert!(!h.session.process("thanks").await.finished);
}

#[tokio::test]
async fn test_finished_check_failure_is_not_finished() {
    let mut h = harness_with(
        vec![
            reply("Anything else?"),
            Err(LlmError::Api {
                status: 400,
                message: "bad request".into(),
            }),
        ],
        AgentConfig::default(),
    );

    let result = h.session.process("thanks").await;
    assert_eq!(result.text, "Anything else?");
    assert!(!result.finished);
}

#[tokio::test]
async fn test_turn_log_window() {
    let script = (0..6).map(|i| reply(&format!("reply {}", i))).collect();
    let mut h = harness_with(
        script,
        AgentConfig::default().with_finished_check(false).with_max_turns(4),
    );

    for i in 0..6 {
        h.session.process(&format!("message {}", i)).await;
        assert!(h.session.turn_count() <= 4);
    }

    let contents: Vec<_> = h
        .session
        .turn_log()
        .turns()
        .map(|t| t.content.clone())
        .collect();
    assert_eq!(contents, vec!["message 4", "reply 4", "message 5", "reply 5"]);
}

#[tokio::test]
async fn test_reset_clears_pending_call() {
    let mut h = harness(vec![create_ticket(r#"{"name": "John"}"#)]);
    h.session.process("ticket").await;
    assert!(matches!(h.session.state(), DialogueState::SlotFilling(_)));

    h.session.reset();
    assert_eq!(h.session.turn_count(), 0);
    assert_eq!(h.session.state(), &DialogueState::Idle);
}

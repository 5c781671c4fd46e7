//! Interactive console assistant
//!
//! Each stdin line is one utterance; replies are printed as speech.

use voice_assistant_agent::{AgentConfig, DialogueServices, DialogueSession};
use voice_assistant_config::{load_settings, Settings};
use voice_assistant_core::{SpeechInput, SpeechOutput};
use voice_assistant_server::{init_tracing, speak_reply, ConsoleSpeaker, LineInput};
use voice_assistant_text_processing::OfflineCommand;

const CLEARED: &str = "Conversation cleared.";
const GOODBYE: &str = "Conversation completed. Goodbye.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("VOICE_ASSISTANT_ENV").ok();
    let settings = load_settings(env.as_deref()).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    init_tracing(&settings.observability);

    let services = match DialogueServices::from_settings(&settings) {
        Ok(services) => services,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        },
    };

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut session = DialogueSession::new(session_id, AgentConfig::from(&settings.dialogue), services);
    let mut input = LineInput::stdin();
    let speaker = ConsoleSpeaker;

    tracing::info!(session_id = %session.id(), "Console session started");

    loop {
        let utterance = match input.next_utterance().await? {
            Some(utterance) => utterance,
            None if input.is_closed() => break,
            None => continue,
        };

        if utterance == "exit" || utterance == "quit" {
            break;
        }

        if let Some(command) = OfflineCommand::detect(&utterance) {
            match command.respond(&chrono::Local::now()) {
                Some(answer) => speaker.speak(&answer).await?,
                None => break,
            }
            continue;
        }

        if utterance == "new chat" {
            session.reset();
            speaker.speak(CLEARED).await?;
            continue;
        }

        let result = session.process(&utterance).await;
        speak_reply(&speaker, &result.text).await?;

        if result.finished {
            speaker.speak(GOODBYE).await?;
            break;
        }
    }

    session.destroy();
    Ok(())
}

//! Console speech collaborators for the interactive CLI
//!
//! Typed lines stand in for transcribed speech, and printed text stands in
//! for synthesized speech.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use voice_assistant_core::{Error, Result, SpeechInput, SpeechOutput};
use voice_assistant_text_processing::strip_code_blocks;

/// Reads one utterance per line
pub struct LineInput<R> {
    lines: Lines<BufReader<R>>,
    closed: bool,
}

impl<R: AsyncRead + Unpin + Send> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            closed: false,
        }
    }

    /// True once the reader hit end of input
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl LineInput<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> SpeechInput for LineInput<R> {
    async fn next_utterance(&mut self) -> Result<Option<String>> {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                let utterance = line.trim().to_lowercase();
                Ok((!utterance.is_empty()).then_some(utterance))
            },
            Ok(None) => {
                self.closed = true;
                Ok(None)
            },
            Err(e) => Err(Error::Speech(e.to_string())),
        }
    }
}

/// Prints assistant speech to stdout
#[derive(Debug, Default)]
pub struct ConsoleSpeaker;

#[async_trait]
impl SpeechOutput for ConsoleSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        println!("Assistant: {}", text);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Speak a reply with its code blocks removed; the code is logged instead
pub async fn speak_reply(output: &dyn SpeechOutput, text: &str) -> Result<()> {
    let spoken = strip_code_blocks(text);
    for block in &spoken.code_blocks {
        tracing::info!(output = output.name(), "Code block not spoken:\n{}", block);
    }
    if spoken.spoken.is_empty() {
        return Ok(());
    }
    output.speak(&spoken.spoken).await
}

//! Confirmation intent and offline command detection
//!
//! Both detectors are keyword based and run on the local machine, so they
//! never cost a round trip to the completion service.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use voice_assistant_core::{ConfirmationClassifier, ConfirmationIntent};

/// Words that confirm a prompt
const AFFIRMATIVE_WORDS: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "correct",
    "right",
    "sure",
    "affirmative",
    "indeed",
    "exactly",
];

/// Words that reject a prompt
const NEGATIVE_WORDS: &[&str] = &[
    "no",
    "nope",
    "incorrect",
    "wrong",
    "not",
    "isn't",
    "isnt",
    "negative",
    "different",
];

/// Keyword classifier for yes/no confirmation replies
///
/// Matching is on whole words, so "incorrect" never counts as "correct".
/// Negative cues are checked first: "no, that's not right" is a denial even
/// though it contains "right".
#[derive(Debug, Clone, Default)]
pub struct KeywordConfirmationClassifier;

impl KeywordConfirmationClassifier {
    pub fn new() -> Self {
        Self
    }

    fn words(reply: &str) -> Vec<String> {
        reply
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase().replace('\u{2019}', "'"))
            .collect()
    }
}

impl ConfirmationClassifier for KeywordConfirmationClassifier {
    fn classify(&self, reply: &str) -> ConfirmationIntent {
        let words = Self::words(reply);

        if words.iter().any(|w| NEGATIVE_WORDS.contains(&w.as_str())) {
            return ConfirmationIntent::Deny;
        }

        if words.iter().any(|w| AFFIRMATIVE_WORDS.contains(&w.as_str())) {
            return ConfirmationIntent::Affirm;
        }

        ConfirmationIntent::Unclear
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Commands answered locally without the completion service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflineCommand {
    CurrentTime,
    CurrentDate,
    StopListening,
}

impl OfflineCommand {
    /// Detect an offline command; the whole utterance must match
    pub fn detect(utterance: &str) -> Option<Self> {
        let text = utterance
            .trim()
            .trim_end_matches(|c: char| c == '?' || c == '.' || c == '!')
            .to_lowercase();

        match text.as_str() {
            "what time is it" | "what is the time" => Some(Self::CurrentTime),
            "what date is it" | "what is the date" => Some(Self::CurrentDate),
            "stop listening" => Some(Self::StopListening),
            _ => None,
        }
    }

    /// Spoken answer for the command at the given instant
    ///
    /// `StopListening` has no answer; the caller ends the input loop.
    pub fn respond<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<String>
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            Self::CurrentTime => Some(format!("The current time is {}", now.format("%I:%M %p"))),
            Self::CurrentDate => Some(format!("Today is {}", now.format("%A, %B %d, %Y"))),
            Self::StopListening => None,
        }
    }
}

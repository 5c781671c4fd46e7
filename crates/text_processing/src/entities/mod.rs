//! Contact entity extraction from loose speech
//!
//! Transcribed speech rarely contains a literal `@`. Users say
//! "jane at example dot com", so extraction works on whitespace tokens and
//! maps the spoken separators before matching:
//! - `at` / `that` become `@`
//! - `dot` becomes `.`
//!
//! # Example
//!
//! ```
//! use voice_assistant_text_processing::entities::{extract_email, normalize_spoken_email};
//!
//! assert_eq!(normalize_spoken_email("jane at example dot com"), "jane@example.com");
//! assert_eq!(
//!     extract_email("sure it's jane at example dot com thanks").as_deref(),
//!     Some("jane@example.com")
//! );
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Full-string email check
static EMAIL_STRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Same shape, unanchored, for finding an address inside a candidate span
static EMAIL_SEARCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// 3-3-4 digit phone number with optional `-` or `.` separators
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap());

/// Map a single spoken token to the symbol it stands for
fn spoken_symbol(token: &str) -> &str {
    if token.eq_ignore_ascii_case("at") || token.eq_ignore_ascii_case("that") {
        "@"
    } else if token.eq_ignore_ascii_case("dot") {
        "."
    } else {
        token
    }
}

/// Normalize a spoken email address
///
/// Tokens `at`/`that` map to `@`, `dot` maps to `.`, then all whitespace is
/// removed. Text without whitespace is already normalized and only trimmed,
/// so applying it twice gives the same result as applying it once.
pub fn normalize_spoken_email(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.contains(char::is_whitespace) {
        return trimmed.to_string();
    }
    trimmed.split_whitespace().map(spoken_symbol).collect()
}

/// Strict format check on an already-normalized address
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_STRICT.is_match(email.trim())
}

/// Lenient check: normalize, then apply the strict pattern
///
/// Returns the normalized address when it passes.
pub fn lenient_email(text: &str) -> Option<String> {
    let normalized = normalize_spoken_email(text);
    is_valid_email(&normalized).then_some(normalized)
}

/// Find an email address spoken or typed anywhere in an utterance
///
/// Each token holding an `@` (after spoken-separator mapping) anchors a
/// candidate span. The span grows left over one local-part word and any
/// dotted segments, and right over the domain and its dotted segments. The
/// first span containing a well-formed address wins.
pub fn extract_email(utterance: &str) -> Option<String> {
    let tokens: Vec<&str> = utterance.split_whitespace().map(spoken_symbol).collect();

    for (anchor, token) in tokens.iter().enumerate() {
        if !token.contains('@') {
            continue;
        }

        let mut start = anchor;
        if token.starts_with('@') && start > 0 {
            start -= 1;
        }
        while start > 0 && joins_left(tokens[start - 1], tokens[start]) {
            start -= 1;
        }

        let mut end = anchor;
        while end + 1 < tokens.len() && joins_right(tokens[end], tokens[end + 1]) {
            end += 1;
        }

        let candidate: String = tokens[start..=end].concat();
        if let Some(found) = EMAIL_SEARCH.find(&candidate) {
            return Some(found.as_str().to_string());
        }
    }

    None
}

fn joins_left(prev: &str, current: &str) -> bool {
    prev == "." || current.starts_with('.')
}

fn joins_right(current: &str, next: &str) -> bool {
    current.ends_with('@') || current == "." || next == "." || next.starts_with('.')
}

/// Extract the last 3-3-4 phone number in the text, as written
pub fn extract_phone_number(text: &str) -> Option<String> {
    PHONE_PATTERN
        .find_iter(text)
        .last()
        .map(|m| m.as_str().to_string())
}

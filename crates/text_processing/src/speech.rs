//! Speech cleanup before text is handed to a speech-output collaborator

use once_cell::sync::Lazy;
use regex::Regex;

/// Fenced code block, with an optional language tag
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:[^\n`]*\n)?(.*?)```").unwrap());

/// Text split into what is spoken and the code that is not
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpokenText {
    /// Text with fenced code blocks removed
    pub spoken: String,
    /// Bodies of the removed code blocks, in order
    pub code_blocks: Vec<String>,
}

/// Remove fenced code blocks from a reply
///
/// Code is never read aloud. An unterminated fence is left untouched.
pub fn strip_code_blocks(text: &str) -> SpokenText {
    let code_blocks: Vec<String> = CODE_FENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .collect();

    if code_blocks.is_empty() {
        return SpokenText {
            spoken: text.trim().to_string(),
            code_blocks,
        };
    }

    let without_code = CODE_FENCE.replace_all(text, " ");
    let spoken = without_code.split_whitespace().collect::<Vec<_>>().join(" ");

    SpokenText {
        spoken,
        code_blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        let result = strip_code_blocks("Your ticket is open.");
        assert_eq!(result.spoken, "Your ticket is open.");
        assert!(result.code_blocks.is_empty());
    }

    #[test]
    fn test_code_block_removed() {
        let text = "Run this:\n```bash\nsudo systemctl restart cups\n```\nThen try again.";
        let result = strip_code_blocks(text);
        assert_eq!(result.spoken, "Run this: Then try again.");
        assert_eq!(result.code_blocks, vec!["sudo systemctl restart cups".to_string()]);
    }

    #[test]
    fn test_multiple_blocks() {
        let text = "A ```x = 1``` B ```\ny = 2\n``` C";
        let result = strip_code_blocks(text);
        assert_eq!(result.spoken, "A B C");
        assert_eq!(result.code_blocks[0], "x = 1");
        assert_eq!(result.code_blocks[1], "y = 2");
    }

    #[test]
    fn test_unterminated_fence_kept() {
        let result = strip_code_blocks("see ```this");
        assert_eq!(result.spoken, "see ```this");
        assert!(result.code_blocks.is_empty());
    }
}

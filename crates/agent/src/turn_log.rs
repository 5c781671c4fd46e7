//! Bounded conversation history

use std::collections::VecDeque;

use voice_assistant_core::{ChatMessage, Turn, TurnRole};

/// Ordered, bounded list of user and assistant turns
///
/// Oldest turns are evicted first; survivors keep insertion order.
#[derive(Debug, Clone)]
pub struct TurnLog {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl TurnLog {
    pub fn new(max_turns: usize) -> Self {
        let max_turns = max_turns.max(1);
        Self {
            turns: VecDeque::with_capacity(max_turns + 1),
            max_turns,
        }
    }

    /// Append a turn, then trim to the window
    pub fn append(&mut self, role: TurnRole, content: impl Into<String>) {
        self.turns.push_back(Turn::new(role, content));
        self.trim();
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.append(TurnRole::User, content);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.append(TurnRole::Assistant, content);
    }

    /// Keep only the most recent `max_turns` turns
    pub fn trim(&mut self) {
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Remove every turn
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Turns in insertion order
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Turns as completion messages, in order
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(ChatMessage::from).collect()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_keeps_most_recent_in_order() {
        let mut log = TurnLog::new(3);
        for i in 0..7 {
            log.push_user(format!("turn {}", i));
        }
        assert_eq!(log.len(), 3);
        let contents: Vec<_> = log.turns().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["turn 4", "turn 5", "turn 6"]);
    }

    #[test]
    fn test_never_exceeds_max() {
        let mut log = TurnLog::new(4);
        for i in 0..20 {
            if i % 2 == 0 {
                log.push_user("u");
            } else {
                log.push_assistant("a");
            }
            assert!(log.len() <= 4);
        }
    }

    #[test]
    fn test_messages_and_reset() {
        let mut log = TurnLog::new(10);
        log.push_user("hello");
        log.push_assistant("hi, how can I help?");

        let messages = log.messages();
        assert_eq!(messages[0], ChatMessage::user("hello"));
        assert_eq!(messages[1], ChatMessage::assistant("hi, how can I help?"));
        assert_eq!(log.last().map(|t| t.role), Some(TurnRole::Assistant));

        log.reset();
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_window_clamped() {
        let mut log = TurnLog::new(0);
        log.push_user("only");
        assert_eq!(log.len(), 1);
        assert_eq!(log.max_turns(), 1);
    }
}

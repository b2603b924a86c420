//! Bounded per-session conversation log
//!
//! Holds at most `max_messages` entries, oldest first. Appending past the
//! bound evicts from the front, so the log always contains exactly the most
//! recent messages in their original order.

use super::types::{Message, Role};
use std::collections::vec_deque::{self, VecDeque};
use tracing::debug;

/// Ordered message log for one session
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: VecDeque<Message>,
    max_messages: usize,
}

impl ChatHistory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages.min(256)),
            max_messages,
        }
    }

    /// Add a message to the end, evicting the oldest entries past the bound
    pub fn append(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
        debug!(
            "Chat history updated, now contains {} messages",
            self.messages.len()
        );
    }

    /// Messages oldest to newest, as sent to the LLM
    ///
    /// The iterator is lazy and `Clone`, so callers can walk it more than
    /// once. It borrows the history, which rules out mutation while it lives.
    pub fn get_context(&self) -> vec_deque::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Owned copy of the current log
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Remove every message. Idempotent.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn last_of(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role() == role)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(history: &ChatHistory) -> Vec<(Role, String)> {
        history
            .get_context()
            .map(|m| (m.role(), m.content().to_string()))
            .collect()
    }

    #[test]
    fn test_append_within_bound() {
        let mut history = ChatHistory::new(4);
        history.append(Message::user("hi"));
        history.append(Message::assistant("hello"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().content(), "hello");
    }

    #[test]
    fn test_fifo_eviction_keeps_most_recent() {
        let mut history = ChatHistory::new(2);
        history.append(Message::user("hi"));
        history.append(Message::assistant("hello"));
        history.append(Message::user("bye"));

        assert_eq!(
            contents(&history),
            vec![
                (Role::Assistant, "hello".to_string()),
                (Role::User, "bye".to_string()),
            ]
        );
    }

    #[test]
    fn test_bound_holds_for_long_sequences() {
        for max in 1..6 {
            let mut history = ChatHistory::new(max);
            for i in 0..20usize {
                history.append(Message::user(format!("m{}", i)));
                assert!(history.len() <= max);

                let expected: Vec<String> = (0..=i)
                    .skip((i + 1).saturating_sub(max))
                    .map(|n| format!("m{}", n))
                    .collect();
                let actual: Vec<String> = history
                    .get_context()
                    .map(|m| m.content().to_string())
                    .collect();
                assert_eq!(actual, expected);
            }
        }
    }

    #[test]
    fn test_zero_bound_retains_nothing() {
        let mut history = ChatHistory::new(0);
        history.append(Message::user("dropped"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut history = ChatHistory::new(3);
        history.append(Message::user("a"));
        history.clear();
        assert_eq!(history.get_context().count(), 0);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_context_is_restartable() {
        let mut history = ChatHistory::new(3);
        history.append(Message::user("a"));
        history.append(Message::assistant("b"));

        let context = history.get_context();
        let first: Vec<_> = context.clone().map(|m| m.content()).collect();
        let second: Vec<_> = context.map(|m| m.content()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_last_of_role() {
        let mut history = ChatHistory::new(5);
        history.append(Message::user("User 1"));
        history.append(Message::assistant("Assistant 1"));
        history.append(Message::user("User 2"));

        assert_eq!(history.last_of(Role::User).unwrap().content(), "User 2");
        assert_eq!(
            history.last_of(Role::Assistant).unwrap().content(),
            "Assistant 1"
        );
    }
}

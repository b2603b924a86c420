//! In-band control commands
//!
//! Transcripts are checked against the configured phrases before they reach
//! the LLM. A transcript matches when, after normalisation, it is exactly one
//! of the phrases. Normalisation lowercases, trims, collapses internal
//! whitespace and drops trailing sentence punctuation that STT providers like
//! to add ("Clear history." still counts).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A command recognised in the user's speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCommand {
    /// Forget the conversation so far
    ClearHistory,
}

impl ControlCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlCommand::ClearHistory => "clear_history",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches transcripts against the configured phrase set
#[derive(Debug, Clone, Default)]
pub struct CommandMatcher {
    phrases: Vec<(String, ControlCommand)>,
}

impl CommandMatcher {
    /// Matcher for the given clear-history phrases
    pub fn new<I, S>(clear_history: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::default();
        for phrase in clear_history {
            matcher.add(phrase.as_ref(), ControlCommand::ClearHistory);
        }
        matcher
    }

    /// Register one more phrase. Blank phrases are ignored.
    pub fn add(&mut self, phrase: &str, command: ControlCommand) {
        let normalized = normalize(phrase);
        if normalized.is_empty() || self.phrases.iter().any(|(p, _)| *p == normalized) {
            return;
        }
        self.phrases.push((normalized, command));
    }

    pub fn detect(&self, transcript: &str) -> Option<ControlCommand> {
        let normalized = normalize(transcript);
        if normalized.is_empty() {
            return None;
        }
        self.phrases
            .iter()
            .find(|(phrase, _)| *phrase == normalized)
            .map(|(_, command)| *command)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Lowercase, collapse whitespace, strip trailing `. , ! ?`
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?'))
        .to_string()
}

//! Turn outcome types

use super::commands::ControlCommand;
use super::session::SessionId;
use crate::audio::SynthesizedAudio;
use crate::error::ProviderFailure;
use crate::utils::TurnTimings;
use std::fmt;

/// Outcome signal handed back to the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnStatus {
    /// A reply was produced and synthesized
    Ok,
    /// Nothing usable was heard; no reply, no history change
    NoInput,
    /// Every LLM provider failed; the reply is the apology
    LlmUnavailable,
    /// A reply exists but could not be turned into audio
    SynthesisFailed,
}

impl TurnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStatus::Ok => "ok",
            TurnStatus::NoInput => "no-input",
            TurnStatus::LlmUnavailable => "llm-unavailable",
            TurnStatus::SynthesisFailed => "synthesis-failed",
        }
    }
}

impl fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a session is inside its current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    Transcribing,
    Routing,
    Generating,
    Synthesizing,
}

/// Providers that served each stage of a turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageProviders {
    pub stt: Option<String>,
    /// The LLM provider that produced the reply, after any fallback
    pub llm: Option<String>,
    pub tts: Option<String>,
}

/// Everything one orchestration cycle produced
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub session_id: SessionId,
    pub status: TurnStatus,
    /// What the user said, once transcribed
    pub transcript: Option<String>,
    /// Text of the reply, also present when synthesis failed
    pub reply_text: Option<String>,
    pub reply_audio: Option<SynthesizedAudio>,
    /// Set when a control command short-circuited the LLM
    pub command: Option<ControlCommand>,
    pub providers: StageProviders,
    /// Failed LLM attempts, in chain order
    pub llm_failures: Vec<ProviderFailure>,
    pub timings: TurnTimings,
    /// Human-readable reason for a non-ok status
    pub detail: Option<String>,
}

impl TurnResult {
    pub(crate) fn new(session_id: SessionId, status: TurnStatus) -> Self {
        Self {
            session_id,
            status,
            transcript: None,
            reply_text: None,
            reply_audio: None,
            command: None,
            providers: StageProviders::default(),
            llm_failures: Vec::new(),
            timings: TurnTimings::default(),
            detail: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == TurnStatus::Ok
    }

    /// True when a control command handled the turn
    pub fn was_command(&self) -> bool {
        self.command.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        let labels: Vec<_> = [
            TurnStatus::Ok,
            TurnStatus::NoInput,
            TurnStatus::LlmUnavailable,
            TurnStatus::SynthesisFailed,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(
            labels,
            vec!["ok", "no-input", "llm-unavailable", "synthesis-failed"]
        );
    }

    #[test]
    fn test_new_result_is_empty() {
        let result = TurnResult::new(SessionId::from("s"), TurnStatus::NoInput);
        assert!(!result.is_ok());
        assert!(!result.was_command());
        assert!(result.reply_text.is_none());
        assert_eq!(TurnPhase::default(), TurnPhase::Idle);
    }
}

//! Error types for the parla orchestrator
//!
//! Every failure here is scoped to one turn. The agent turns them into a
//! [`TurnStatus`](crate::agent::TurnStatus) instead of handing raw errors to
//! the transport layer.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single provider call (one attempt, one provider)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderCallError {
    /// The call did not complete within its configured bound
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The provider rejected the credentials (401/403)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider throttled the request (429)
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, DNS or I/O failure before a response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded into the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The provider answered successfully but with no usable content
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The request could not be built from the given input
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderCallError {
    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => ProviderCallError::Auth(body),
            429 => ProviderCallError::RateLimited(body),
            _ => ProviderCallError::Http { status, body },
        }
    }

    /// Short, stable label for logs and failure records
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderCallError::Timeout(_) => "timeout",
            ProviderCallError::Auth(_) => "auth",
            ProviderCallError::RateLimited(_) => "rate_limited",
            ProviderCallError::Http { .. } => "http",
            ProviderCallError::Transport(_) => "transport",
            ProviderCallError::MalformedResponse(_) => "malformed_response",
            ProviderCallError::EmptyResponse => "empty_response",
            ProviderCallError::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl From<reqwest::Error> for ProviderCallError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ProviderCallError::from_status(status.as_u16(), e.to_string())
        } else if e.is_decode() {
            ProviderCallError::MalformedResponse(e.to_string())
        } else {
            ProviderCallError::Transport(e.to_string())
        }
    }
}

/// One failed attempt recorded by the LLM fallback loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Provider name (e.g. `"groq"`)
    pub provider: String,
    /// Model identifier the attempt used
    pub model: String,
    /// What went wrong
    pub error: ProviderCallError,
}

impl ProviderFailure {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        error: ProviderCallError,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            error,
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.provider, self.model, self.error)
    }
}

/// Every entry of the fallback chain failed
///
/// `failures` holds exactly one record per chain entry, in chain order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("all {} LLM providers failed: {}", .failures.len(), join_failures(.failures))]
pub struct AllProvidersExhaustedError {
    pub failures: Vec<ProviderFailure>,
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Speech-to-text failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    /// The captured utterance held no samples
    #[error("no audio to transcribe")]
    EmptyAudio,

    /// The provider produced no usable text (silence, noise)
    #[error("transcript was empty")]
    EmptyTranscript,

    /// The provider call itself failed
    #[error("{provider} transcription failed: {source}")]
    Provider {
        provider: String,
        source: ProviderCallError,
    },
}

/// Text-to-speech failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Nothing to speak
    #[error("no text to synthesize")]
    EmptyText,

    /// Input is larger than the provider accepts in one request
    #[error("text of {len} chars exceeds the {provider} limit of {limit}")]
    TextTooLong {
        provider: String,
        len: usize,
        limit: usize,
    },

    /// The provider call itself failed
    #[error("{provider} synthesis failed: {source}")]
    Provider {
        provider: String,
        source: ProviderCallError,
    },
}

/// Crate-level error
#[derive(Error, Debug, Clone)]
pub enum ParlaError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Audio error: {0}")]
    AudioError(String),

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("LLM error: {0}")]
    LlmUnavailable(#[from] AllProvidersExhaustedError),
}

impl From<std::io::Error> for ParlaError {
    fn from(e: std::io::Error) -> Self {
        ParlaError::IOError(e.to_string())
    }
}

impl From<toml::de::Error> for ParlaError {
    fn from(e: toml::de::Error) -> Self {
        ParlaError::ConfigError(e.to_string())
    }
}

impl From<hound::Error> for ParlaError {
    fn from(e: hound::Error) -> Self {
        ParlaError::AudioError(e.to_string())
    }
}

impl ParlaError {
    /// Check if this error is recoverable
    ///
    /// Turn-scoped failures leave the session usable for the next turn;
    /// configuration and I/O problems need someone to fix the setup.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ParlaError::ConfigError(_) => false,
            ParlaError::IOError(_) => false,
            ParlaError::AudioError(_) => true,
            ParlaError::Transcription(_) => true,
            ParlaError::Synthesis(_) => true,
            ParlaError::LlmUnavailable(_) => true,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ParlaError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            ParlaError::IOError(_) => "File system error occurred.".to_string(),
            ParlaError::AudioError(_) => "Audio could not be read. Please try again.".to_string(),
            ParlaError::Transcription(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            ParlaError::Synthesis(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            ParlaError::LlmUnavailable(_) => {
                "The assistant is temporarily unavailable. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ParlaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ProviderCallError::from_status(401, "bad key"),
            ProviderCallError::Auth(_)
        ));
        assert!(matches!(
            ProviderCallError::from_status(403, "forbidden"),
            ProviderCallError::Auth(_)
        ));
        assert!(matches!(
            ProviderCallError::from_status(429, "slow down"),
            ProviderCallError::RateLimited(_)
        ));
        assert_eq!(
            ProviderCallError::from_status(503, "down"),
            ProviderCallError::Http {
                status: 503,
                body: "down".to_string()
            }
        );
    }

    #[test]
    fn test_exhausted_display_keeps_order() {
        let err = AllProvidersExhaustedError {
            failures: vec![
                ProviderFailure::new(
                    "openai",
                    "gpt-3.5-turbo",
                    ProviderCallError::Timeout(Duration::from_secs(5)),
                ),
                ProviderFailure::new("groq", "llama", ProviderCallError::EmptyResponse),
            ],
        };

        let text = err.to_string();
        assert!(text.starts_with("all 2 LLM providers failed"));
        let first = text.find("openai/gpt-3.5-turbo").unwrap();
        let second = text.find("groq/llama").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_recoverability() {
        assert!(!ParlaError::ConfigError("x".into()).is_recoverable());
        assert!(ParlaError::from(TranscriptionError::EmptyTranscript).is_recoverable());
        assert!(ParlaError::from(AllProvidersExhaustedError { failures: vec![] }).is_recoverable());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ProviderCallError::Timeout(Duration::ZERO).kind(), "timeout");
        assert_eq!(ProviderCallError::EmptyResponse.kind(), "empty_response");
    }
}

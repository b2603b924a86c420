//! Provider capability contracts and the built-in wire clients
//!
//! The orchestration core only sees three capabilities:
//!
//! - [`Transcriber`]: audio in, text out
//! - [`Synthesizer`]: text in, encoded audio out
//! - [`ChatModel`]: ordered chat messages in, one whole reply out
//!
//! Which wire client backs a capability is decided once, from a
//! [`ProviderSpec`], by [`build_transcriber`], [`build_synthesizer`] and
//! [`build_chat_model`]. Every client makes exactly one attempt per call;
//! retry and fallback are policy of the services above.

pub mod elevenlabs;
pub mod openai;
pub mod spec;

pub use elevenlabs::{ElevenLabsSynthesizer, ElevenLabsTranscriber};
pub use openai::{OpenAiChat, OpenAiSpeech, OpenAiTranscriber};
pub use spec::{
    LlmProvider, LlmSpec, ProviderKind, ProviderSpec, SttProvider, SttSpec, TtsProvider, TtsSpec,
    DEFAULT_TEMPERATURE,
};

use crate::audio::{AudioData, SynthesizedAudio};
use crate::error::ProviderCallError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Role of a chat message on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A chat message in provider-neutral form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call voice overrides; unset fields use the provider's configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceParams {
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub language: Option<String>,
}

impl VoiceParams {
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Speech-to-text capability
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Provider name (e.g. `"groq"`)
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Transcribe one utterance. `language` overrides the configured one.
    async fn transcribe(
        &self,
        audio: &AudioData,
        language: Option<&str>,
    ) -> Result<String, ProviderCallError>;
}

/// Text-to-speech capability
#[async_trait]
pub trait Synthesizer: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Largest input, in characters, one request may carry
    fn max_chars(&self) -> usize;

    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> Result<SynthesizedAudio, ProviderCallError>;
}

/// Chat-completion capability
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Produce one whole reply for the given conversation
    async fn complete(&self, messages: &[ChatTurn]) -> Result<String, ProviderCallError>;
}

/// Resolve an STT spec to its wire client
pub fn build_transcriber(spec: &SttSpec, http: &reqwest::Client) -> Arc<dyn Transcriber> {
    match spec.provider {
        SttProvider::ElevenLabs => Arc::new(ElevenLabsTranscriber::new(spec, http.clone())),
        SttProvider::Groq | SttProvider::OpenAi => {
            Arc::new(OpenAiTranscriber::new(spec, http.clone()))
        }
    }
}

/// Resolve a TTS spec to its wire client
pub fn build_synthesizer(spec: &TtsSpec, http: &reqwest::Client) -> Arc<dyn Synthesizer> {
    match spec.provider {
        TtsProvider::ElevenLabs => Arc::new(ElevenLabsSynthesizer::new(spec, http.clone())),
        TtsProvider::Kokoro | TtsProvider::OpenAi => {
            Arc::new(OpenAiSpeech::new(spec, http.clone()))
        }
    }
}

/// Resolve an LLM spec to its wire client
pub fn build_chat_model(spec: &LlmSpec, http: &reqwest::Client) -> Arc<dyn ChatModel> {
    // Every supported LLM kind speaks the OpenAI chat-completions format
    Arc::new(OpenAiChat::new(spec, http.clone()))
}

/// Turn a non-success response into the matching call error
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderCallError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderCallError::from_status(status.as_u16(), truncate(&body, 512)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_pick_wire_client_per_kind() {
        let http = reqwest::Client::new();

        let stt = build_transcriber(&SttSpec::new(SttProvider::Groq), &http);
        assert_eq!(stt.name(), "groq");
        assert_eq!(stt.model(), "whisper-large-v3-turbo");

        let tts = build_synthesizer(&TtsSpec::new(TtsProvider::ElevenLabs), &http);
        assert_eq!(tts.name(), "elevenlabs");
        assert_eq!(tts.max_chars(), 5000);

        let kokoro = build_synthesizer(
            &TtsSpec::new(TtsProvider::Kokoro).with_max_chars(1000),
            &http,
        );
        assert_eq!(kokoro.name(), "kokoro");
        assert_eq!(kokoro.max_chars(), 1000);

        let llm = build_chat_model(&LlmSpec::new(LlmProvider::Gemini), &http);
        assert_eq!(llm.name(), "gemini");
        assert_eq!(llm.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_chat_role_wire_names() {
        let turn = ChatTurn::system("be brief");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("àèìòù", 2), "àè...");
        assert_eq!(truncate("short", 10), "short");
    }
}

//! OpenAI-compatible wire clients
//!
//! OpenAI, Groq, OpenRouter, Gemini and Ollama all expose the same
//! `/chat/completions` shape; Groq and OpenAI share `/audio/transcriptions`;
//! OpenAI and a local Kokoro server share `/audio/speech`. One client per
//! endpoint covers all of them, parameterised by `ProviderSpec::base_url`.

use super::spec::{LlmSpec, ProviderKind, SttSpec, TtsProvider, TtsSpec, DEFAULT_TEMPERATURE};
use super::{ensure_success, ChatModel, ChatTurn, Synthesizer, Transcriber, VoiceParams};
use crate::audio::{encode_wav, AudioData, SynthesizedAudio};
use crate::error::ProviderCallError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chat completions over `POST {base}/chat/completions`
pub struct OpenAiChat {
    name: &'static str,
    model: String,
    base_url: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: Option<u32>,
    http: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(spec: &LlmSpec, http: reqwest::Client) -> Self {
        Self {
            name: spec.name(),
            model: spec.model_id().to_string(),
            base_url: spec.base_url(),
            api_key: spec.api_key(),
            temperature: spec.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: spec.max_tokens,
            http,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatTurn]) -> Result<String, ProviderCallError> {
        debug!(
            provider = self.name,
            model = %self.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = ensure_success(request.send().await?).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderCallError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderCallError::EmptyResponse);
        }
        Ok(content)
    }
}

/// Transcription over `POST {base}/audio/transcriptions`
pub struct OpenAiTranscriber {
    name: &'static str,
    model: String,
    base_url: String,
    api_key: Option<String>,
    language: String,
    http: reqwest::Client,
}

impl OpenAiTranscriber {
    pub fn new(spec: &SttSpec, http: reqwest::Client) -> Self {
        Self {
            name: spec.name(),
            model: spec.model_id().to_string(),
            base_url: spec.base_url(),
            api_key: spec.api_key(),
            language: spec
                .language
                .clone()
                .unwrap_or_else(|| spec.provider.default_language().to_string()),
            http,
        }
    }
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn transcribe(
        &self,
        audio: &AudioData,
        language: Option<&str>,
    ) -> Result<String, ProviderCallError> {
        let wav = encode_wav(audio).map_err(|e| ProviderCallError::InvalidRequest(e.to_string()))?;
        let language = language.unwrap_or(self.language.as_str()).to_string();

        debug!(
            provider = self.name,
            bytes = wav.len(),
            language = %language,
            "Uploading audio for transcription"
        );

        let file = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", language)
            .text("response_format", "json")
            .text("temperature", "0");

        let mut request = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = ensure_success(request.send().await?).await?;
        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ProviderCallError::MalformedResponse(e.to_string()))?;
        Ok(parsed.text)
    }
}

/// Speech synthesis over `POST {base}/audio/speech`
pub struct OpenAiSpeech {
    provider: TtsProvider,
    model: String,
    base_url: String,
    api_key: Option<String>,
    voice: String,
    speed: Option<f32>,
    language: Option<String>,
    max_chars: usize,
    http: reqwest::Client,
}

impl OpenAiSpeech {
    pub fn new(spec: &TtsSpec, http: reqwest::Client) -> Self {
        Self {
            provider: spec.provider,
            model: spec.model_id().to_string(),
            base_url: spec.base_url(),
            api_key: spec.api_key(),
            voice: spec
                .voice
                .clone()
                .unwrap_or_else(|| spec.provider.default_voice().to_string()),
            speed: spec.speed,
            language: spec.language.clone(),
            max_chars: spec
                .max_chars
                .unwrap_or_else(|| spec.provider.default_max_chars()),
            http,
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
    /// Kokoro-only language selector
    #[serde(skip_serializing_if = "Option::is_none")]
    lang_code: Option<&'a str>,
}

#[async_trait]
impl Synthesizer for OpenAiSpeech {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_chars(&self) -> usize {
        self.max_chars
    }

    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceParams,
    ) -> Result<SynthesizedAudio, ProviderCallError> {
        let lang_code = match self.provider {
            TtsProvider::Kokoro => voice.language.as_deref().or(self.language.as_deref()),
            _ => None,
        };
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: voice.voice.as_deref().unwrap_or(self.voice.as_str()),
            response_format: "mp3",
            speed: voice.speed.or(self.speed),
            lang_code,
        };

        debug!(
            provider = self.provider.name(),
            chars = text.chars().count(),
            "Requesting speech synthesis"
        );

        let mut request = self
            .http
            .post(format!("{}/audio/speech", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = ensure_success(request.send().await?).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderCallError::EmptyResponse);
        }
        Ok(SynthesizedAudio::new(bytes, "mp3"))
    }
}

//! ElevenLabs wire clients
//!
//! Speech-to-text posts a multipart upload to `/v1/speech-to-text`;
//! text-to-speech posts JSON to `/v1/text-to-speech/{voice_id}` and gets the
//! encoded audio back as the response body. Both authenticate with the
//! `xi-api-key` header.

use super::spec::{SttSpec, TtsSpec};
use super::{ensure_success, Synthesizer, Transcriber, VoiceParams};
use crate::audio::{encode_wav, AudioData, SynthesizedAudio};
use crate::error::ProviderCallError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

const API_KEY_HEADER: &str = "xi-api-key";
const OUTPUT_FORMAT: &str = "mp3_44100_128";

pub struct ElevenLabsTranscriber {
    model: String,
    base_url: String,
    api_key: Option<String>,
    language: String,
    http: reqwest::Client,
}

impl ElevenLabsTranscriber {
    pub fn new(spec: &SttSpec, http: reqwest::Client) -> Self {
        Self {
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

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct SpeechToTextResponse {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Transcriber for ElevenLabsTranscriber {
    fn name(&self) -> &str {
        "elevenlabs"
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
            bytes = wav.len(),
            language = %language,
            "Uploading audio to ElevenLabs speech-to-text"
        );

        let file = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model_id", self.model.clone())
            .text("language_code", language)
            .text("diarize", "false")
            .text("tag_audio_events", "false");

        let request = self
            .http
            .post(format!("{}/v1/speech-to-text", self.base_url))
            .multipart(form);
        let response = ensure_success(self.authorize(request).send().await?).await?;

        let parsed: SpeechToTextResponse = response
            .json()
            .await
            .map_err(|e| ProviderCallError::MalformedResponse(e.to_string()))?;
        Ok(parsed.text)
    }
}

pub struct ElevenLabsSynthesizer {
    model: String,
    base_url: String,
    api_key: Option<String>,
    voice: String,
    speed: Option<f32>,
    max_chars: usize,
    http: reqwest::Client,
}

impl ElevenLabsSynthesizer {
    pub fn new(spec: &TtsSpec, http: reqwest::Client) -> Self {
        Self {
            model: spec.model_id().to_string(),
            base_url: spec.base_url(),
            api_key: spec.api_key(),
            voice: spec
                .voice
                .clone()
                .unwrap_or_else(|| spec.provider.default_voice().to_string()),
            speed: spec.speed,
            max_chars: spec
                .max_chars
                .unwrap_or_else(|| spec.provider.default_max_chars()),
            http,
        }
    }
}

#[derive(Serialize)]
struct TextToSpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<VoiceSettings>,
}

#[derive(Serialize)]
struct VoiceSettings {
    speed: f32,
}

#[async_trait]
impl Synthesizer for ElevenLabsSynthesizer {
    fn name(&self) -> &str {
        "elevenlabs"
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
        let voice_id = voice.voice.as_deref().unwrap_or(self.voice.as_str());
        let body = TextToSpeechRequest {
            text,
            model_id: &self.model,
            voice_settings: voice.speed.or(self.speed).map(|speed| VoiceSettings { speed }),
        };

        debug!(
            voice = voice_id,
            chars = text.chars().count(),
            "Requesting ElevenLabs text-to-speech"
        );

        let mut request = self
            .http
            .post(format!("{}/v1/text-to-speech/{}", self.base_url, voice_id))
            .query(&[("output_format", OUTPUT_FORMAT)])
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = ensure_success(request.send().await?).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderCallError::EmptyResponse);
        }
        Ok(SynthesizedAudio::new(bytes, "mp3"))
    }
}

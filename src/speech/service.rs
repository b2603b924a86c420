//! Speech facade over one STT and one TTS provider
//!
//! Each capability has exactly one active provider, picked when the service
//! is built. Calls are single attempts bounded by a timeout; a timeout
//! surfaces as the capability's provider error.

use crate::audio::{AudioData, SynthesizedAudio};
use crate::error::{ProviderCallError, SynthesisError, TranscriptionError};
use crate::providers::{
    build_synthesizer, build_transcriber, SttSpec, Synthesizer, Transcriber, TtsSpec, VoiceParams,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on a single STT or TTS call
pub const DEFAULT_SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

/// STT and TTS as two independent capabilities
#[derive(Clone)]
pub struct SpeechService {
    stt: Arc<dyn Transcriber>,
    tts: Arc<dyn Synthesizer>,
    stt_timeout: Duration,
    tts_timeout: Duration,
}

impl SpeechService {
    pub fn new(stt: Arc<dyn Transcriber>, tts: Arc<dyn Synthesizer>) -> Self {
        Self {
            stt,
            tts,
            stt_timeout: DEFAULT_SPEECH_TIMEOUT,
            tts_timeout: DEFAULT_SPEECH_TIMEOUT,
        }
    }

    /// Build the wire clients for both capabilities
    pub fn from_specs(stt: &SttSpec, tts: &TtsSpec, http: &reqwest::Client) -> Self {
        info!(
            stt = stt.name(),
            stt_model = stt.model_id(),
            tts = tts.name(),
            tts_model = tts.model_id(),
            "Speech providers selected"
        );
        Self::new(build_transcriber(stt, http), build_synthesizer(tts, http))
    }

    pub fn with_timeouts(mut self, stt: Duration, tts: Duration) -> Self {
        self.stt_timeout = stt;
        self.tts_timeout = tts;
        self
    }

    /// Name of the active STT provider
    pub fn stt_provider(&self) -> &str {
        self.stt.name()
    }

    /// Name of the active TTS provider
    pub fn tts_provider(&self) -> &str {
        self.tts.name()
    }

    /// Transcribe one utterance
    ///
    /// Returns the trimmed transcript. Silence or noise that yields no text is
    /// reported as [`TranscriptionError::EmptyTranscript`].
    pub async fn transcribe(
        &self,
        audio: &AudioData,
        language_hint: Option<&str>,
    ) -> Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        let provider = self.stt.name().to_string();
        let text = match tokio::time::timeout(
            self.stt_timeout,
            self.stt.transcribe(audio, language_hint),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(source)) => {
                warn!(provider = %provider, error = %source, "Transcription failed");
                return Err(TranscriptionError::Provider { provider, source });
            }
            Err(_) => {
                warn!(provider = %provider, timeout = ?self.stt_timeout, "Transcription timed out");
                return Err(TranscriptionError::Provider {
                    provider,
                    source: ProviderCallError::Timeout(self.stt_timeout),
                });
            }
        };

        let text = text.trim();
        if text.is_empty() {
            debug!(provider = %provider, "Transcript empty");
            return Err(TranscriptionError::EmptyTranscript);
        }

        debug!(provider = %provider, chars = text.chars().count(), "Transcribed utterance");
        Ok(text.to_string())
    }

    /// Synthesize `text` with the active TTS provider
    ///
    /// Text longer than the provider's per-request limit is rejected rather
    /// than truncated.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: Option<&VoiceParams>,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let provider = self.tts.name().to_string();
        let len = text.chars().count();
        let limit = self.tts.max_chars();
        if len > limit {
            return Err(SynthesisError::TextTooLong {
                provider,
                len,
                limit,
            });
        }

        let defaults = VoiceParams::default();
        let voice = voice.unwrap_or(&defaults);

        let audio = match tokio::time::timeout(self.tts_timeout, self.tts.synthesize(text, voice))
            .await
        {
            Ok(Ok(audio)) => audio,
            Ok(Err(source)) => {
                warn!(provider = %provider, error = %source, "Synthesis failed");
                return Err(SynthesisError::Provider { provider, source });
            }
            Err(_) => {
                warn!(provider = %provider, timeout = ?self.tts_timeout, "Synthesis timed out");
                return Err(SynthesisError::Provider {
                    provider,
                    source: ProviderCallError::Timeout(self.tts_timeout),
                });
            }
        };

        if audio.is_empty() {
            return Err(SynthesisError::Provider {
                provider,
                source: ProviderCallError::EmptyResponse,
            });
        }

        debug!(provider = %provider, bytes = audio.len(), format = %audio.format, "Synthesized reply");
        Ok(audio)
    }
}

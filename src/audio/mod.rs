//! Audio containers exchanged with the transport layer
//!
//! The orchestrator never decodes or plays audio itself. Captured speech
//! arrives as [`AudioData`] (one utterance) and synthesized replies leave as
//! [`SynthesizedAudio`] (encoded bytes in whatever format the TTS provider
//! produced).

pub mod wav;

pub use wav::{encode_wav, read_wav, write_bytes};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One captured user utterance (interleaved f32 PCM)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Mono audio at the given rate
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Encoded reply audio returned by a TTS provider
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    /// Encoded audio as received from the provider
    pub bytes: Bytes,
    /// Container/codec label, e.g. `"mp3"` or `"wav"`
    pub format: String,
}

impl SynthesizedAudio {
    pub fn new(bytes: impl Into<Bytes>, format: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            format: format.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

//! Speech capabilities
//!
//! This module provides:
//! - Speech-to-text through the configured STT provider
//! - Text-to-speech through the configured TTS provider

pub mod service;

pub use service::{SpeechService, DEFAULT_SPEECH_TIMEOUT};

//! Provider descriptions supplied by configuration
//!
//! Each capability has a closed set of provider kinds. A [`ProviderSpec`]
//! pairs one kind with the model and the provider-specific knobs; anything
//! left unset falls back to the kind's defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Per-kind defaults shared by every capability enum
pub trait ProviderKind: Copy + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Stable lowercase name, as written in configuration
    fn name(&self) -> &'static str;

    fn default_model(&self) -> &'static str;

    /// Base URL the wire client talks to when no endpoint is configured
    fn default_endpoint(&self) -> &'static str;

    /// Environment variable holding the API key, if the provider needs one
    fn default_api_key_env(&self) -> Option<&'static str>;
}

macro_rules! display_by_name {
    ($kind:ty) => {
        impl fmt::Display for $kind {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Speech-to-text providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttProvider {
    ElevenLabs,
    Groq,
    OpenAi,
}

impl SttProvider {
    pub fn default_language(&self) -> &'static str {
        match self {
            SttProvider::ElevenLabs => "ita",
            SttProvider::Groq | SttProvider::OpenAi => "it",
        }
    }
}

impl ProviderKind for SttProvider {
    fn name(&self) -> &'static str {
        match self {
            SttProvider::ElevenLabs => "elevenlabs",
            SttProvider::Groq => "groq",
            SttProvider::OpenAi => "openai",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            SttProvider::ElevenLabs => "scribe_v1",
            SttProvider::Groq => "whisper-large-v3-turbo",
            SttProvider::OpenAi => "gpt-4o-transcribe",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            SttProvider::ElevenLabs => ELEVENLABS_BASE,
            SttProvider::Groq => GROQ_BASE,
            SttProvider::OpenAi => OPENAI_BASE,
        }
    }

    fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            SttProvider::ElevenLabs => Some("ELEVENLABS_API_KEY"),
            SttProvider::Groq => Some("GROQ_API_KEY"),
            SttProvider::OpenAi => Some("OPENAI_API_KEY"),
        }
    }
}

display_by_name!(SttProvider);

/// Text-to-speech providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    ElevenLabs,
    /// Local Kokoro server exposing the OpenAI speech endpoint
    Kokoro,
    OpenAi,
}

impl TtsProvider {
    pub fn default_voice(&self) -> &'static str {
        match self {
            TtsProvider::ElevenLabs => "JBFqnCBsd6RMkjVDRZzb",
            TtsProvider::Kokoro => "im_nicola",
            TtsProvider::OpenAi => "alloy",
        }
    }

    /// Largest input, in characters, accepted by one request
    pub fn default_max_chars(&self) -> usize {
        match self {
            TtsProvider::ElevenLabs => 5000,
            TtsProvider::Kokoro | TtsProvider::OpenAi => 4096,
        }
    }
}

impl ProviderKind for TtsProvider {
    fn name(&self) -> &'static str {
        match self {
            TtsProvider::ElevenLabs => "elevenlabs",
            TtsProvider::Kokoro => "kokoro",
            TtsProvider::OpenAi => "openai",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            TtsProvider::ElevenLabs => "eleven_multilingual_v2",
            TtsProvider::Kokoro => "kokoro",
            TtsProvider::OpenAi => "gpt-4o-mini-tts",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            TtsProvider::ElevenLabs => ELEVENLABS_BASE,
            TtsProvider::Kokoro => "http://localhost:8880/v1",
            TtsProvider::OpenAi => OPENAI_BASE,
        }
    }

    fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            TtsProvider::ElevenLabs => Some("ELEVENLABS_API_KEY"),
            TtsProvider::Kokoro => None,
            TtsProvider::OpenAi => Some("OPENAI_API_KEY"),
        }
    }
}

display_by_name!(TtsProvider);

/// Language model providers, all reached over the OpenAI chat wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Ollama,
    Gemini,
    OpenRouter,
    Groq,
}

impl ProviderKind for LlmProvider {
    fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Ollama => "ollama",
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::Groq => "groq",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-3.5-turbo",
            LlmProvider::Ollama => "llama3.1:8b",
            LlmProvider::Gemini => "gemini-1.5-flash",
            LlmProvider::OpenRouter => "qwen/qwq-32b:free",
            LlmProvider::Groq => "llama-3.1-8b-instant",
        }
    }

    fn default_endpoint(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => OPENAI_BASE,
            LlmProvider::Ollama => "http://localhost:11434/v1",
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
            LlmProvider::Groq => GROQ_BASE,
        }
    }

    fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Ollama => None,
            LlmProvider::Gemini => Some("GEMINI_API_KEY"),
            LlmProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
            LlmProvider::Groq => Some("GROQ_API_KEY"),
        }
    }
}

display_by_name!(LlmProvider);

const OPENAI_BASE: &str = "https://api.openai.com/v1";
const GROQ_BASE: &str = "https://api.groq.com/openai/v1";
const ELEVENLABS_BASE: &str = "https://api.elevenlabs.io";

/// Default sampling temperature for chat completions
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// One configured provider instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec<K> {
    pub provider: K,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,

    /// Base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// TTS input limit override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
}

pub type SttSpec = ProviderSpec<SttProvider>;
pub type TtsSpec = ProviderSpec<TtsProvider>;
pub type LlmSpec = ProviderSpec<LlmProvider>;

impl<K: ProviderKind> ProviderSpec<K> {
    pub fn new(provider: K) -> Self {
        Self {
            provider,
            model: None,
            language: None,
            voice: None,
            speed: None,
            endpoint: None,
            api_key_env: None,
            temperature: None,
            max_tokens: None,
            max_chars: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    /// Configured model, or the kind's default
    pub fn model_id(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> String {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
            .to_string()
    }

    /// Resolve the API key from the environment
    ///
    /// A missing key is not an error here: the provider will answer with an
    /// auth failure, which the caller handles like any other call failure.
    pub fn api_key(&self) -> Option<String> {
        let var = self
            .api_key_env
            .as_deref()
            .or_else(|| self.provider.default_api_key_env())?;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Some(key),
            _ => {
                warn!(provider = self.name(), var, "API key not found in environment");
                None
            }
        }
    }
}

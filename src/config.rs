//! Agent configuration
//!
//! Loaded once from TOML at startup and read-only afterwards. Every section
//! is optional; anything left out takes the default shown below.
//!
//! ```toml
//! system_prompt = "Sei un assistente vocale..."
//!
//! [stt]
//! provider = "elevenlabs"
//! language = "ita"
//!
//! [tts]
//! provider = "kokoro"
//! voice = "im_nicola"
//!
//! [[llm]]
//! provider = "openai"
//!
//! [[llm]]
//! provider = "groq"
//!
//! [history]
//! max_history_messages = 10
//!
//! [commands]
//! clear_history = ["clear history", "nuova conversazione"]
//!
//! [timeouts]
//! llm_ms = 20000
//! ```

use crate::error::{ParlaError, Result};
use crate::llm::{FallbackChain, DEFAULT_CLEARED_REPLY, DEFAULT_SYSTEM_PROMPT, DEFAULT_UNAVAILABLE_REPLY};
use crate::providers::{LlmProvider, LlmSpec, SttProvider, SttSpec, TtsProvider, TtsSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Configuration for the complete agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Instruction prepended to every LLM request; blank disables it
    pub system_prompt: Option<String>,

    /// Speech-to-text provider
    pub stt: SttSpec,

    /// Text-to-speech provider
    pub tts: TtsSpec,

    /// LLM fallback chain, primary first
    pub llm: Vec<LlmSpec>,

    pub history: HistoryConfig,

    pub commands: CommandConfig,

    pub replies: ReplyConfig,

    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Messages kept per session; older ones are evicted first
    pub max_history_messages: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_messages: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Phrases that wipe the session's history
    pub clear_history: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            clear_history: vec![
                "clear history".to_string(),
                "reset chat".to_string(),
                "nuova conversazione".to_string(),
                "cancella cronologia".to_string(),
            ],
        }
    }
}

/// User-facing texts the agent speaks on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Confirmation after a clear-history command
    pub history_cleared: String,

    /// Apology when no LLM provider could answer
    pub unavailable: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            history_cleared: DEFAULT_CLEARED_REPLY.to_string(),
            unavailable: DEFAULT_UNAVAILABLE_REPLY.to_string(),
        }
    }
}

/// Bounds on single provider calls, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub stt_ms: u64,
    /// Applies to each attempt in the fallback chain
    pub llm_ms: u64,
    pub tts_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            stt_ms: 30_000,
            llm_ms: 30_000,
            tts_ms: 30_000,
        }
    }
}

impl TimeoutConfig {
    pub fn stt(&self) -> Duration {
        Duration::from_millis(self.stt_ms)
    }

    pub fn llm(&self) -> Duration {
        Duration::from_millis(self.llm_ms)
    }

    pub fn tts(&self) -> Duration {
        Duration::from_millis(self.tts_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            stt: SttSpec::new(SttProvider::ElevenLabs),
            tts: TtsSpec::new(TtsProvider::ElevenLabs),
            llm: vec![LlmSpec::new(LlmProvider::OpenAi)],
            history: HistoryConfig::default(),
            commands: CommandConfig::default(),
            replies: ReplyConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ParlaError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(
            path = %path.display(),
            stt = config.stt.name(),
            tts = config.tts.name(),
            llm_chain = config.llm.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ParlaError::ConfigError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm.is_empty() {
            return Err(ParlaError::ConfigError(
                "at least one [[llm]] provider is required".to_string(),
            ));
        }

        if self.history.max_history_messages == 0 {
            return Err(ParlaError::ConfigError(
                "history.max_history_messages must be at least 1".to_string(),
            ));
        }

        let timeouts = &self.timeouts;
        if timeouts.stt_ms == 0 || timeouts.llm_ms == 0 || timeouts.tts_ms == 0 {
            return Err(ParlaError::ConfigError(
                "timeouts must be greater than zero".to_string(),
            ));
        }

        if self.tts.max_chars == Some(0) {
            return Err(ParlaError::ConfigError(
                "tts.max_chars must be greater than zero".to_string(),
            ));
        }

        if self.replies.history_cleared.trim().is_empty()
            || self.replies.unavailable.trim().is_empty()
        {
            return Err(ParlaError::ConfigError(
                "replies must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// The LLM chain as a validated [`FallbackChain`]
    pub fn fallback_chain(&self) -> Result<FallbackChain> {
        FallbackChain::new(self.llm.clone())
    }

    /// Effective system prompt, `None` when blank or unset
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
    }

    pub fn with_stt(mut self, stt: SttSpec) -> Self {
        self.stt = stt;
        self
    }

    pub fn with_tts(mut self, tts: TtsSpec) -> Self {
        self.tts = tts;
        self
    }

    /// Replace the whole LLM chain
    pub fn with_llm_chain(mut self, chain: Vec<LlmSpec>) -> Self {
        self.llm = chain;
        self
    }

    /// Append a fallback to the end of the LLM chain
    pub fn with_fallback(mut self, spec: LlmSpec) -> Self {
        self.llm.push(spec);
        self
    }

    pub fn with_max_history(mut self, max_history_messages: usize) -> Self {
        self.history.max_history_messages = max_history_messages;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn without_system_prompt(mut self) -> Self {
        self.system_prompt = None;
        self
    }

    pub fn with_clear_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.clear_history = phrases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_replies(mut self, replies: ReplyConfig) -> Self {
        self.replies = replies;
        self
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.max_history_messages, 10);
        assert_eq!(config.llm.len(), 1);
        assert_eq!(config.commands.clear_history.len(), 4);
        assert!(config.system_prompt().is_some());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AgentConfig::from_toml_str("").unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = AgentConfig::from_toml_str(
            r#"
            system_prompt = "Rispondi in una frase."

            [stt]
            provider = "groq"

            [tts]
            provider = "kokoro"
            voice = "im_nicola"
            speed = 1.1

            [[llm]]
            provider = "openrouter"

            [[llm]]
            provider = "ollama"
            model = "llama3.1:8b"
            endpoint = "http://gpu:11434/v1"

            [history]
            max_history_messages = 4

            [commands]
            clear_history = ["ricomincia"]

            [replies]
            unavailable = "Riprova tra poco."

            [timeouts]
            llm_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.system_prompt(), Some("Rispondi in una frase."));
        assert_eq!(config.stt.provider, SttProvider::Groq);
        assert_eq!(config.tts.voice.as_deref(), Some("im_nicola"));
        assert_eq!(config.llm[1].base_url(), "http://gpu:11434/v1");
        assert_eq!(config.history.max_history_messages, 4);
        assert_eq!(config.commands.clear_history, vec!["ricomincia"]);
        assert_eq!(config.replies.unavailable, "Riprova tra poco.");
        assert_eq!(config.replies.history_cleared, DEFAULT_CLEARED_REPLY);
        assert_eq!(config.timeouts.llm(), Duration::from_secs(5));
        assert_eq!(config.timeouts.stt_ms, 30_000);

        let chain = config.fallback_chain().unwrap();
        assert_eq!(chain.primary().provider, LlmProvider::OpenRouter);
    }

    #[test]
    fn test_validation_failures() {
        assert!(AgentConfig::default().with_llm_chain(Vec::new()).validate().is_err());
        assert!(AgentConfig::default().with_max_history(0).validate().is_err());

        let zero_timeout = AgentConfig::default().with_timeouts(TimeoutConfig {
            stt_ms: 0,
            ..TimeoutConfig::default()
        });
        assert!(zero_timeout.validate().is_err());

        assert!(AgentConfig::from_toml_str("llm = []").is_err());
        assert!(AgentConfig::from_toml_str("[stt]\nprovider = \"whisper\"").is_err());
    }

    #[test]
    fn test_blank_system_prompt_disables_it() {
        let config = AgentConfig::default().with_system_prompt("   ");
        assert_eq!(config.system_prompt(), None);
        assert_eq!(AgentConfig::default().without_system_prompt().system_prompt(), None);
    }

    #[test]
    fn test_builder_chain() {
        let config = AgentConfig::default()
            .with_stt(SttSpec::new(SttProvider::OpenAi))
            .with_tts(TtsSpec::new(TtsProvider::Kokoro))
            .with_fallback(LlmSpec::new(LlmProvider::Groq))
            .with_clear_phrases(["basta"]);

        assert_eq!(config.stt.provider, SttProvider::OpenAi);
        assert_eq!(config.llm.len(), 2);
        assert_eq!(config.llm[1].provider, LlmProvider::Groq);
        assert_eq!(config.commands.clear_history, vec!["basta".to_string()]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[history]\nmax_history_messages = 6").unwrap();

        let config = AgentConfig::load(file.path()).unwrap();
        assert_eq!(config.history.max_history_messages, 6);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AgentConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ParlaError::ConfigError(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AgentConfig::default().with_fallback(LlmSpec::new(LlmProvider::Gemini));
        let text = config.to_toml_string().unwrap();
        assert_eq!(AgentConfig::from_toml_str(&text).unwrap(), config);
    }
}

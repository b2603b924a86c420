//! Ordered list of LLM providers
//!
//! The first entry is the primary; the rest are tried in order when the one
//! before fails. The chain is never empty.

use crate::error::{ParlaError, Result};
use crate::providers::{build_chat_model, ChatModel, LlmSpec};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackChain {
    entries: Vec<LlmSpec>,
}

impl FallbackChain {
    pub fn new(entries: Vec<LlmSpec>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ParlaError::ConfigError(
                "LLM fallback chain must contain at least one provider".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    /// Chain with a single provider and no fallbacks
    pub fn single(spec: LlmSpec) -> Self {
        Self {
            entries: vec![spec],
        }
    }

    pub fn primary(&self) -> &LlmSpec {
        &self.entries[0]
    }

    /// Every entry after the primary, in trial order
    pub fn fallbacks(&self) -> &[LlmSpec] {
        &self.entries[1..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LlmSpec> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a constructed chain
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry to its wire client, preserving order
    pub fn build_models(&self, http: &reqwest::Client) -> Vec<Arc<dyn ChatModel>> {
        self.entries
            .iter()
            .map(|spec| build_chat_model(spec, http))
            .collect()
    }
}

impl<'a> IntoIterator for &'a FallbackChain {
    type Item = &'a LlmSpec;
    type IntoIter = std::slice::Iter<'a, LlmSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LlmProvider;

    #[test]
    fn test_empty_chain_is_rejected() {
        assert!(matches!(
            FallbackChain::new(Vec::new()),
            Err(ParlaError::ConfigError(_))
        ));
    }

    #[test]
    fn test_primary_and_fallbacks_keep_order() {
        let chain = FallbackChain::new(vec![
            LlmSpec::new(LlmProvider::OpenAi),
            LlmSpec::new(LlmProvider::Groq),
            LlmSpec::new(LlmProvider::Ollama),
        ])
        .unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.primary().provider, LlmProvider::OpenAi);
        let rest: Vec<_> = chain.fallbacks().iter().map(|s| s.provider).collect();
        assert_eq!(rest, vec![LlmProvider::Groq, LlmProvider::Ollama]);
    }

    #[test]
    fn test_single_has_no_fallbacks() {
        let chain = FallbackChain::single(LlmSpec::new(LlmProvider::Gemini));
        assert_eq!(chain.len(), 1);
        assert!(chain.fallbacks().is_empty());
    }

    #[test]
    fn test_build_models_in_chain_order() {
        let chain = FallbackChain::new(vec![
            LlmSpec::new(LlmProvider::OpenRouter),
            LlmSpec::new(LlmProvider::Ollama),
        ])
        .unwrap();
        let models = chain.build_models(&reqwest::Client::new());
        let names: Vec<_> = models.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, vec!["openrouter", "ollama"]);
    }
}

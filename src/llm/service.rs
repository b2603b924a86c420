//! Reply generation with ordered provider fallback
//!
//! [`LlmService::generate`] walks the configured models in order. The first
//! model that answers wins; every failure before it is recorded. When all of
//! them fail the caller gets an [`AllProvidersExhaustedError`] holding one
//! failure per model, in chain order.

use super::chain::FallbackChain;
use crate::error::{AllProvidersExhaustedError, ParlaError, ProviderCallError, ProviderFailure, Result};
use crate::messages::{Message, Role};
use crate::providers::{ChatModel, ChatTurn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default bound on a single chat-completion attempt
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// A successful reply and how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub reply: String,
    /// Provider that produced the reply
    pub provider: String,
    pub model: String,
    /// Attempts that failed before the successful one, in order
    pub failures: Vec<ProviderFailure>,
}

#[derive(Clone)]
pub struct LlmService {
    models: Vec<Arc<dyn ChatModel>>,
    system_prompt: Option<String>,
    timeout: Duration,
}

impl LlmService {
    pub fn new(models: Vec<Arc<dyn ChatModel>>) -> Result<Self> {
        if models.is_empty() {
            return Err(ParlaError::ConfigError(
                "LLM service needs at least one model".to_string(),
            ));
        }
        Ok(Self {
            models,
            system_prompt: None,
            timeout: DEFAULT_LLM_TIMEOUT,
        })
    }

    /// Build one wire client per chain entry
    pub fn from_chain(chain: &FallbackChain, http: &reqwest::Client) -> Result<Self> {
        info!(
            primary = chain.primary().name(),
            fallbacks = chain.fallbacks().len(),
            "LLM fallback chain configured"
        );
        Self::new(chain.build_models(http))
    }

    /// Instruction sent ahead of every conversation; never part of history
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt)
        };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `(provider, model)` for each entry, in trial order
    pub fn providers(&self) -> Vec<(String, String)> {
        self.models
            .iter()
            .map(|m| (m.name().to_string(), m.model().to_string()))
            .collect()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Generate a reply to `prompt` given the prior conversation
    ///
    /// `context` holds the messages before `prompt`, oldest first. The prompt
    /// is always sent as the final user turn, even when the context ends with
    /// an identical user message.
    pub async fn generate<'a, I>(
        &self,
        prompt: &str,
        context: I,
    ) -> std::result::Result<Generation, AllProvidersExhaustedError>
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let messages = self.build_messages(prompt, context);
        let mut failures = Vec::new();

        for (index, model) in self.models.iter().enumerate() {
            let started = Instant::now();
            debug!(
                provider = model.name(),
                model = model.model(),
                attempt = index + 1,
                "Trying LLM provider"
            );

            let outcome = match tokio::time::timeout(self.timeout, model.complete(&messages)).await
            {
                Ok(Ok(reply)) if reply.trim().is_empty() => Err(ProviderCallError::EmptyResponse),
                Ok(result) => result,
                Err(_) => Err(ProviderCallError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(reply) => {
                    if !failures.is_empty() {
                        info!(
                            provider = model.name(),
                            model = model.model(),
                            failed_before = failures.len(),
                            "Fallback provider answered"
                        );
                    }
                    debug!(
                        provider = model.name(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "LLM reply received"
                    );
                    return Ok(Generation {
                        reply: reply.trim().to_string(),
                        provider: model.name().to_string(),
                        model: model.model().to_string(),
                        failures,
                    });
                }
                Err(error) => {
                    warn!(
                        provider = model.name(),
                        model = model.model(),
                        kind = error.kind(),
                        error = %error,
                        "LLM provider failed, trying next"
                    );
                    failures.push(ProviderFailure::new(model.name(), model.model(), error));
                }
            }
        }

        let err = AllProvidersExhaustedError { failures };
        warn!(error = %err, "LLM fallback chain exhausted");
        Err(err)
    }

    fn build_messages<'a, I>(&self, prompt: &str, context: I) -> Vec<ChatTurn>
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let mut messages = Vec::new();
        if let Some(system) = &self.system_prompt {
            messages.push(ChatTurn::system(system.clone()));
        }

        for message in context {
            messages.push(match message.role() {
                Role::User => ChatTurn::user(message.content()),
                Role::Assistant => ChatTurn::assistant(message.content()),
            });
        }

        messages.push(ChatTurn::user(prompt));
        messages
    }
}

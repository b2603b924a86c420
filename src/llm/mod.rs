//! Language model layer
//!
//! [`FallbackChain`] is the configured provider order and [`LlmService`]
//! walks it until one provider answers.

pub mod chain;
pub mod prompts;
pub mod service;

pub use chain::FallbackChain;
pub use prompts::{DEFAULT_CLEARED_REPLY, DEFAULT_SYSTEM_PROMPT, DEFAULT_UNAVAILABLE_REPLY};
pub use service::{Generation, LlmService, DEFAULT_LLM_TIMEOUT};

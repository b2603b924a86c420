pub mod agent;
pub mod audio;
pub mod config;
pub mod error;
pub mod llm;
pub mod messages;
pub mod providers;
pub mod speech;
pub mod utils;

pub use agent::{Agent, ControlCommand, SessionId, TurnPhase, TurnResult, TurnStatus};
pub use audio::{AudioData, SynthesizedAudio};
pub use config::AgentConfig;
pub use error::{
    AllProvidersExhaustedError, ParlaError, ProviderCallError, ProviderFailure, Result,
    SynthesisError, TranscriptionError,
};
pub use llm::{FallbackChain, LlmService};
pub use messages::{ChatHistory, Message, Role};
pub use speech::SpeechService;

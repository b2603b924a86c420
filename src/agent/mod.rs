//! Conversation-turn orchestration
//!
//! The [`Agent`] runs one turn per call: transcribe, check for a control
//! command, generate a reply with the session's history, synthesize it. It
//! owns the session store and is the only writer of any session's history.
//!
//! Within a turn the history changes in a fixed order: the user message is
//! appended before the LLM is called (so the model sees what it is answering)
//! and the assistant message only after a reply exists. A failed or
//! cancelled turn therefore never leaves a half-finished exchange behind.

pub mod commands;
pub mod session;
pub mod turn;

pub use commands::{CommandMatcher, ControlCommand};
pub use session::{Session, SessionHandle, SessionId, SessionStore};
pub use turn::{StageProviders, TurnPhase, TurnResult, TurnStatus};

use crate::audio::AudioData;
use crate::config::{AgentConfig, ReplyConfig};
use crate::error::{ParlaError, Result};
use crate::llm::LlmService;
use crate::messages::Message;
use crate::speech::SpeechService;
use crate::utils::{Stage, Stopwatch};
use session::PhaseGuard;
use tracing::{debug, error, info, warn};

pub struct Agent {
    speech: SpeechService,
    llm: LlmService,
    commands: CommandMatcher,
    sessions: SessionStore,
    replies: ReplyConfig,
}

impl Agent {
    /// Assemble an agent from ready-made services
    ///
    /// `config` supplies the history bound, the control phrases and the canned
    /// replies. Provider selection, timeouts and the system prompt are already
    /// baked into `speech` and `llm`.
    pub fn new(speech: SpeechService, llm: LlmService, config: &AgentConfig) -> Self {
        Self {
            speech,
            llm,
            commands: CommandMatcher::new(&config.commands.clear_history),
            sessions: SessionStore::new(config.history.max_history_messages),
            replies: config.replies.clone(),
        }
    }

    /// Build every provider client from configuration
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ParlaError::ConfigError(format!("HTTP client: {}", e)))?;

        let speech = SpeechService::from_specs(&config.stt, &config.tts, &http)
            .with_timeouts(config.timeouts.stt(), config.timeouts.tts());

        let mut llm = LlmService::from_chain(&config.fallback_chain()?, &http)?
            .with_timeout(config.timeouts.llm());
        if let Some(prompt) = config.system_prompt() {
            llm = llm.with_system_prompt(prompt);
        }

        Ok(Self::new(speech, llm, config))
    }

    /// Run one turn from captured audio
    ///
    /// The session is created on its first turn. Turns for the same session
    /// queue behind each other; other sessions are not blocked.
    pub async fn handle_turn(&self, session_id: &SessionId, audio: &AudioData) -> TurnResult {
        let (handle, mut session) = self.sessions.acquire(session_id).await;
        let phase = handle.enter(TurnPhase::Transcribing);

        let mut clock = Stopwatch::start();
        let mut result = TurnResult::new(session_id.clone(), TurnStatus::Ok);
        result.providers.stt = Some(self.speech.stt_provider().to_string());

        debug!(
            session = %session_id,
            seconds = audio.duration_seconds(),
            "Turn started"
        );

        let transcript = self.speech.transcribe(audio, None).await;
        clock.lap(Stage::Stt);

        match transcript {
            Ok(text) => {
                self.respond(&mut session, &phase, text, clock, result)
                    .await
            }
            Err(err) => {
                info!(session = %session_id, reason = %err, "No usable input, ending turn");
                result.status = TurnStatus::NoInput;
                result.detail = Some(err.to_string());
                session.turns += 1;
                result.timings = clock.finish();
                result
            }
        }
    }

    /// Run one turn from text that is already transcribed
    pub async fn handle_text(&self, session_id: &SessionId, text: &str) -> TurnResult {
        let (handle, mut session) = self.sessions.acquire(session_id).await;
        let phase = handle.enter(TurnPhase::Routing);

        let clock = Stopwatch::start();
        let mut result = TurnResult::new(session_id.clone(), TurnStatus::Ok);

        let text = text.trim();
        if text.is_empty() {
            debug!(session = %session_id, "Empty text input, ending turn");
            result.status = TurnStatus::NoInput;
            session.turns += 1;
            result.timings = clock.finish();
            return result;
        }

        self.respond(&mut session, &phase, text.to_string(), clock, result)
            .await
    }

    /// Everything after a transcript exists: routing, generation, synthesis
    async fn respond(
        &self,
        session: &mut Session,
        phase: &PhaseGuard<'_>,
        transcript: String,
        mut clock: Stopwatch,
        mut result: TurnResult,
    ) -> TurnResult {
        phase.set(TurnPhase::Routing);
        info!(session = %session.id, transcript = %transcript, "Transcript received");
        result.transcript = Some(transcript.clone());

        if let Some(command) = self.commands.detect(&transcript) {
            match command {
                ControlCommand::ClearHistory => session.history.clear(),
            }
            info!(session = %session.id, command = %command, "Control command intercepted");
            result.command = Some(command);

            let reply = self.replies.history_cleared.clone();
            self.speak(phase, &mut clock, &mut result, reply, TurnStatus::Ok)
                .await;
        } else {
            session.history.append(Message::user(transcript.as_str()));

            phase.set(TurnPhase::Generating);
            clock.reset_lap();
            // The transcript goes in as the prompt, so leave it out of the context
            let prior = session.history.len().saturating_sub(1);
            let generation = self
                .llm
                .generate(&transcript, session.history.get_context().take(prior))
                .await;
            clock.lap(Stage::Llm);

            match generation {
                Ok(generation) => {
                    session
                        .history
                        .append(Message::assistant(generation.reply.as_str()));
                    result.providers.llm = Some(generation.provider);
                    result.llm_failures = generation.failures;

                    self.speak(
                        phase,
                        &mut clock,
                        &mut result,
                        generation.reply,
                        TurnStatus::Ok,
                    )
                    .await;
                }
                Err(err) => {
                    error!(
                        session = %session.id,
                        attempts = err.failures.len(),
                        error = %err,
                        "No LLM provider could answer"
                    );
                    result.detail = Some(err.to_string());
                    result.llm_failures = err.failures;

                    let apology = self.replies.unavailable.clone();
                    self.speak(
                        phase,
                        &mut clock,
                        &mut result,
                        apology,
                        TurnStatus::LlmUnavailable,
                    )
                    .await;
                }
            }
        }

        session.turns += 1;
        result.timings = clock.finish();
        debug!(
            session = %session.id,
            status = %result.status,
            timings = %result.timings.summary(),
            "Turn finished"
        );
        result
    }

    /// Synthesize `reply` and record the outcome on `result`
    ///
    /// The reply text is kept even when synthesis fails. An apology that cannot
    /// be synthesized keeps the `llm-unavailable` status.
    async fn speak(
        &self,
        phase: &PhaseGuard<'_>,
        clock: &mut Stopwatch,
        result: &mut TurnResult,
        reply: String,
        status: TurnStatus,
    ) {
        phase.set(TurnPhase::Synthesizing);
        result.providers.tts = Some(self.speech.tts_provider().to_string());

        clock.reset_lap();
        let audio = self.speech.synthesize(&reply, None).await;
        clock.lap(Stage::Tts);
        result.reply_text = Some(reply);

        match audio {
            Ok(audio) => {
                result.reply_audio = Some(audio);
                result.status = status;
            }
            Err(err) => {
                warn!(
                    session = %result.session_id,
                    error = %err,
                    "Synthesis failed, returning text only"
                );
                if status == TurnStatus::LlmUnavailable {
                    result.status = TurnStatus::LlmUnavailable;
                } else {
                    result.status = TurnStatus::SynthesisFailed;
                    result.detail = Some(err.to_string());
                }
            }
        }
    }

    /// Dispose of a session and its history. Returns false if it did not exist.
    ///
    /// A turn in flight finishes on the old session. Turns still queued for
    /// the id run on a fresh one.
    pub fn end_session(&self, session_id: &SessionId) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Clear a session's history, keeping the session itself
    ///
    /// Waits for a turn in flight on that session to finish first.
    pub async fn reset_session(&self, session_id: &SessionId) -> bool {
        match self.sessions.get(session_id) {
            Some(handle) => {
                let mut session = handle.lock().await;
                if handle.is_closed() {
                    return false;
                }
                session.history.clear();
                info!(session = %session_id, "Session history reset");
                true
            }
            None => false,
        }
    }

    /// Copy of a session's history, oldest first
    pub async fn history(&self, session_id: &SessionId) -> Option<Vec<Message>> {
        let handle = self.sessions.get(session_id)?;
        let session = handle.lock().await;
        if handle.is_closed() {
            return None;
        }
        Some(session.history.snapshot())
    }

    /// Current phase of a session, without waiting for its turn to finish
    pub fn phase(&self, session_id: &SessionId) -> Option<TurnPhase> {
        self.sessions.get(session_id).map(|handle| handle.phase())
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.ids()
    }

    pub fn speech(&self) -> &SpeechService {
        &self.speech
    }

    pub fn llm(&self) -> &LlmService {
        &self.llm
    }
}

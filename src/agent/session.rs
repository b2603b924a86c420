//! Per-session state and the session store
//!
//! Each session sits behind its own async mutex. A turn holds the lock from
//! transcription to synthesis, so turns of one session run one after another
//! while turns of different sessions never contend.

use super::turn::TurnPhase;
use crate::messages::ChatHistory;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque identifier of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One ongoing conversation
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub history: ChatHistory,
    /// Completed turns, including no-input ones
    pub turns: u64,
}

impl Session {
    pub fn new(id: SessionId, max_history: usize) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            history: ChatHistory::new(max_history),
            turns: 0,
        }
    }
}

/// Shared handle to a live session
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    created_at: DateTime<Utc>,
    state: Arc<tokio::sync::Mutex<Session>>,
    phase: RwLock<TurnPhase>,
    /// Set once the session is removed from the store
    closed: AtomicBool,
}

impl SessionHandle {
    fn new(id: SessionId, max_history: usize) -> Self {
        let session = Session::new(id.clone(), max_history);
        Self {
            id,
            created_at: session.created_at,
            state: Arc::new(tokio::sync::Mutex::new(session)),
            phase: RwLock::new(TurnPhase::Idle),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Wait for exclusive access to the session state
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Session> {
        self.state.lock().await
    }

    pub fn phase(&self) -> TurnPhase {
        *self.phase.read()
    }

    /// True once the session has been ended; its history is no longer reachable
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Track the turn's phase until the guard drops, then return to idle
    pub(crate) fn enter(&self, phase: TurnPhase) -> PhaseGuard<'_> {
        *self.phase.write() = phase;
        PhaseGuard { handle: self }
    }
}

/// Resets the session phase to `Idle` when the turn ends, however it ends
pub(crate) struct PhaseGuard<'a> {
    handle: &'a SessionHandle,
}

impl PhaseGuard<'_> {
    pub(crate) fn set(&self, phase: TurnPhase) {
        *self.handle.phase.write() = phase;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.handle.phase.write() = TurnPhase::Idle;
    }
}

/// Session id to live session
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Arc<SessionHandle>>>,
    max_history: usize,
}

impl SessionStore {
    /// Empty store; new sessions get histories bounded at `max_history`
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_history,
        }
    }

    /// Existing session, or a fresh one registered under `id`
    pub fn get_or_create(&self, id: &SessionId) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.lock();
        if let Some(handle) = sessions.get(id) {
            return handle.clone();
        }
        let handle = Arc::new(SessionHandle::new(id.clone(), self.max_history));
        sessions.insert(id.clone(), handle.clone());
        info!(session = %id, "Session created");
        handle
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.lock().get(id).cloned()
    }

    /// Wait for exclusive access to the live session registered under `id`
    ///
    /// A caller that queued on a session which was ended in the meantime
    /// moves on to the session that replaced it, so it never reads or writes
    /// a disposed history.
    pub async fn acquire(
        &self,
        id: &SessionId,
    ) -> (Arc<SessionHandle>, OwnedMutexGuard<Session>) {
        loop {
            let handle = self.get_or_create(id);
            let guard = handle.state.clone().lock_owned().await;
            if !handle.is_closed() {
                return (handle, guard);
            }
            debug!(session = %id, "Session ended while waiting, reopening");
        }
    }

    /// Drop the session from the store
    ///
    /// A turn already running keeps its handle and finishes; turns still
    /// waiting for it, and every later turn, use a new, empty session.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<SessionHandle>> {
        let removed = self.sessions.lock().remove(id);
        if let Some(handle) = &removed {
            handle.closed.store(true, Ordering::Release);
            info!(session = %id, "Session ended");
        }
        removed
    }

    /// Ids of all live sessions, sorted
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }
}

//! Registry of in-flight sessions.
//!
//! Every session holds a [`SessionTicket`] for its whole life. The ticket
//! carries the session's state machine and cancellation token and mirrors
//! each transition into the registry, so "list active sessions" never has to
//! reconstruct state from running tasks. Dropping the ticket removes the
//! entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use droidscope_core::{SessionError, SessionId, SessionKind, SessionState, SessionSummary};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Device name used for exclusivity when no device id was given.
const DEFAULT_DEVICE: &str = "usb";

type TargetKey = (String, String);

struct Entry {
    summary: SessionSummary,
    cancel: CancellationToken,
    target_key: Option<TargetKey>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, Entry>,
    /// Active traces by (device, target), when exclusivity is on.
    active_targets: HashMap<TargetKey, SessionId>,
}

/// Shared table of active sessions.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Inner>>,
    exclusive_traces: bool,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("active", &self.len())
            .field("exclusive_traces", &self.exclusive_traces)
            .finish()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that allows one active trace per (device, target).
    pub fn with_exclusive_traces(exclusive: bool) -> Self {
        Self {
            inner: Arc::default(),
            exclusive_traces: exclusive,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new session in `Idle`.
    pub fn open(
        &self,
        kind: SessionKind,
        device_id: Option<&str>,
        target: Option<&str>,
    ) -> Result<SessionTicket, SessionError> {
        let id = SessionId::new();
        let cancel = CancellationToken::new();
        let mut inner = self.lock();

        let target_key = match (kind, target) {
            (SessionKind::Trace, Some(target)) if self.exclusive_traces => {
                let device = device_id.unwrap_or(DEFAULT_DEVICE).to_string();
                let key = (device, target.to_string());
                if inner.active_targets.contains_key(&key) {
                    return Err(SessionError::AlreadyActive {
                        device: key.0,
                        target: key.1,
                    });
                }
                inner.active_targets.insert(key.clone(), id);
                Some(key)
            }
            _ => None,
        };

        let summary = SessionSummary {
            id,
            kind,
            state: SessionState::Idle,
            device_id: device_id.map(str::to_string),
            target: target.map(str::to_string),
            started_at: Utc::now(),
        };
        inner.sessions.insert(
            id,
            Entry {
                summary,
                cancel: cancel.clone(),
                target_key,
            },
        );
        drop(inner);

        debug!(session_id = %id, %kind, "session registered");
        Ok(SessionTicket {
            id,
            kind,
            state: SessionState::Idle,
            cancel,
            registry: self.clone(),
        })
    }

    /// Snapshot of every active session, oldest first.
    pub fn list(&self) -> Vec<SessionSummary> {
        let mut sessions: Vec<_> = self
            .lock()
            .sessions
            .values()
            .map(|e| e.summary.clone())
            .collect();
        sessions.sort_by_key(|s| s.started_at);
        sessions
    }

    pub fn get(&self, id: SessionId) -> Option<SessionSummary> {
        self.lock().sessions.get(&id).map(|e| e.summary.clone())
    }

    /// Request cancellation of a session.
    ///
    /// Returns `false` if no such session is active. Cancelling twice is
    /// harmless.
    pub fn cancel(&self, id: SessionId) -> bool {
        let token = self.lock().sessions.get(&id).map(|e| e.cancel.clone());
        match token {
            Some(token) => {
                info!(session_id = %id, "session cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, id: SessionId, state: SessionState) {
        if let Some(entry) = self.lock().sessions.get_mut(&id) {
            entry.summary.state = state;
        }
    }

    fn remove(&self, id: SessionId) {
        let mut inner = self.lock();
        if let Some(entry) = inner.sessions.remove(&id) {
            if let Some(key) = entry.target_key {
                inner.active_targets.remove(&key);
            }
        }
    }
}

/// A session's claim on its registry entry.
///
/// Owns the session state machine; every transition goes through
/// [`advance`](Self::advance) and is mirrored into the registry.
#[derive(Debug)]
pub struct SessionTicket {
    id: SessionId,
    kind: SessionKind,
    state: SessionState,
    cancel: CancellationToken,
    registry: SessionRegistry,
}

impl SessionTicket {
    pub const fn id(&self) -> SessionId {
        self.id
    }

    pub const fn kind(&self) -> SessionKind {
        self.kind
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Token cancelled by [`SessionRegistry::cancel`].
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Apply a validated state transition.
    pub fn advance(&mut self, next: SessionState) -> Result<(), SessionError> {
        self.state.advance(next.clone())?;
        debug!(session_id = %self.id, state = next.name(), "session state changed");
        self.registry.update(self.id, next);
        Ok(())
    }

    /// Record `err` as the terminal state, unless already terminal.
    pub fn fail(&mut self, err: &SessionError) {
        if self.state.is_terminal() {
            return;
        }
        let _ = self.advance(SessionState::Error {
            reason: err.to_string(),
        });
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.registry.remove(self.id);
        debug!(session_id = %self.id, state = self.state.name(), "session released");
    }
}

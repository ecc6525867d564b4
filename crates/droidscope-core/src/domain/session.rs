//! Session identity and lifecycle.
//!
//! Every session moves through the same explicit state machine:
//!
//! ```text
//! Idle -> Precondition -> Spawning -> Streaming -> Closed
//!   |          |              |           |
//!   +----------+--------------+-----------+-----> Killed | Error
//! ```
//!
//! `Precondition` is only entered by trace sessions. `Killed` and `Error` are
//! reachable from every non-terminal state, so a cancellation that lands while
//! a precondition is still running is representable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;

/// Generated identifier of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What a session does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    /// Attach a tracer to a running app and stream its output.
    Trace,
    /// Run a bounded enumeration and return one JSON payload.
    Enumeration,
    /// Stream an arbitrary process (device log, shell command).
    GenericStream,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "trace",
            Self::Enumeration => "enumeration",
            Self::GenericStream => "generic-stream",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    Precondition,
    Spawning,
    Streaming,
    /// The process exited on its own, with any exit code.
    Closed { code: Option<i32> },
    /// The session was cancelled and its process (if any) was killed.
    Killed,
    /// The session failed before or while running.
    Error { reason: String },
}

impl SessionState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed { .. } | Self::Killed | Self::Error { .. })
    }

    /// Whether `next` is a legal successor of `self`.
    pub const fn can_advance_to(&self, next: &Self) -> bool {
        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Self::Killed | Self::Error { .. }) => true,
            (Self::Idle, Self::Precondition | Self::Spawning)
            | (Self::Precondition, Self::Spawning)
            | (Self::Spawning, Self::Streaming)
            | (Self::Streaming, Self::Closed { .. }) => true,
            _ => false,
        }
    }

    /// Move to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: Self) -> Result<(), SessionError> {
        if !self.can_advance_to(&next) {
            return Err(SessionError::InvalidTransition {
                from: self.name(),
                to: next.name(),
            });
        }
        *self = next;
        Ok(())
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Precondition => "precondition",
            Self::Spawning => "spawning",
            Self::Streaming => "streaming",
            Self::Closed { .. } => "closed",
            Self::Killed => "killed",
            Self::Error { .. } => "error",
        }
    }
}

/// Serializable view of a registered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub kind: SessionKind,
    #[serde(flatten)]
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_happy_path() {
        let mut state = SessionState::Idle;
        state.advance(SessionState::Precondition).unwrap();
        state.advance(SessionState::Spawning).unwrap();
        state.advance(SessionState::Streaming).unwrap();
        state.advance(SessionState::Closed { code: Some(1) }).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn cancellation_is_reachable_from_every_intermediate_state() {
        for from in [
            SessionState::Idle,
            SessionState::Precondition,
            SessionState::Spawning,
            SessionState::Streaming,
        ] {
            assert!(from.can_advance_to(&SessionState::Killed), "{from:?}");
            assert!(from.can_advance_to(&SessionState::Error {
                reason: "x".into()
            }));
        }
    }

    #[test]
    fn terminal_states_are_final() {
        let mut state = SessionState::Closed { code: Some(0) };
        let err = state.advance(SessionState::Killed).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                from: "closed",
                to: "killed"
            }
        ));
        assert_eq!(state, SessionState::Closed { code: Some(0) });
    }

    #[test]
    fn cannot_skip_spawning() {
        assert!(!SessionState::Precondition.can_advance_to(&SessionState::Streaming));
        assert!(!SessionState::Idle.can_advance_to(&SessionState::Closed { code: None }));
    }

    #[test]
    fn summary_serializes_flat_state() {
        let summary = SessionSummary {
            id: SessionId::new(),
            kind: SessionKind::Trace,
            state: SessionState::Closed { code: Some(0) },
            device_id: None,
            target: Some("Example".into()),
            started_at: Utc::now(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["kind"], "trace");
        assert_eq!(json["state"], "closed");
        assert_eq!(json["code"], 0);
        assert!(json.get("deviceId").is_none());
    }

    #[test]
    fn session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}

//! Error taxonomy for sessions and the device-bridge collaborator.
//!
//! A process that exits with a non-zero code is not an error here: the exit
//! code travels to the subscriber as data (see [`crate::ExitReport`]).

use thiserror::Error;

/// Failures of the device-bridge collaborator.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The tool could not be started at all.
    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{tool} exited with code {code:?}: {stderr}")]
    CommandFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The tool's output could not be understood.
    #[error("unexpected output from {tool}: {reason}")]
    InvalidOutput { tool: String, reason: String },
}

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required request field was absent or empty.
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// A request field was present but unusable.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The trace target is neither running nor installed.
    #[error("application '{target}' not found on device")]
    TargetNotInstalled { target: String },

    /// Launching the trace target failed.
    #[error("failed to launch '{identifier}': {reason}")]
    LaunchFailed { identifier: String, reason: String },

    /// The device-bridge collaborator failed while checking readiness.
    #[error("device bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The OS refused to create the process.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The payload sentinels were missing or out of order.
    #[error("output did not contain a delimited JSON payload")]
    MalformedOutput,

    /// The delimited payload was not a JSON array.
    #[error("failed to parse payload: {0}")]
    ParseFailure(String),

    /// Another session already owns this (device, target) pair.
    #[error("a trace session for '{target}' is already active on {device}")]
    AlreadyActive { device: String, target: String },

    /// The session was cancelled before it produced a result.
    #[error("session cancelled")]
    Cancelled,

    /// Internal misuse of the session state machine.
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl SessionError {
    /// Stable discriminant for clients and logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "MISSING_PARAMETER",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::TargetNotInstalled { .. } => "TARGET_NOT_INSTALLED",
            Self::LaunchFailed { .. } => "LAUNCH_FAILED",
            Self::Bridge(_) => "BRIDGE_ERROR",
            Self::Spawn { .. } => "SPAWN_ERROR",
            Self::MalformedOutput => "MALFORMED_OUTPUT",
            Self::ParseFailure(_) => "PARSE_FAILURE",
            Self::AlreadyActive { .. } => "ALREADY_ACTIVE",
            Self::Cancelled => "CANCELLED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

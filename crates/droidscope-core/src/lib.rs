//! Core domain types and port definitions for droidscope.
//!
//! This crate holds everything about device sessions that does not touch the
//! operating system: the session state machine, line splitting, payload
//! recovery, the error taxonomy and the ports (traits) that adapters
//! implement.
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod enumeration;
pub mod error;
pub mod lines;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{DEFAULT_ENUMERATION_TIMEOUT, DEFAULT_KILL_GRACE, ToolConfig};
pub use domain::{
    CommandSpec, Device, ExitReport, ExitVerb, InstalledApp, Line, LogLevel, LogcatFilter, Origin,
    RunningProcess, SessionId, SessionKind, SessionState, SessionSummary, StreamEvent,
    TraceRequest,
};
pub use enumeration::{PayloadMarkers, extract_payload};
pub use error::{BridgeError, SessionError};
pub use lines::LineMultiplexer;
pub use ports::{CommandOutput, DeviceBridgePort, EventSink, RecordingSink, SinkClosed};

//! Process runtime for droidscope.
//!
//! Everything that touches the operating system lives here: spawning and
//! killing tool processes, reading their pipes, the `adb`/`frida-ps` bridge
//! and the sessions that tie them to a subscriber.
#![deny(unsafe_code)]

pub mod bridge;
pub mod process;
pub mod session;
pub mod system;

#[cfg(test)]
mod testing;

// Re-export the main entry points
pub use bridge::ToolBridge;
pub use process::{Liveness, ProcessEvent, ProcessHandle, shutdown_child};
pub use system::{ToolStatus, check_tools};
pub use session::{
    EnumerationSession, GenericStreamSession, Readiness, SessionManager, SessionRegistry,
    SessionTicket, StreamOutcome, StreamSession, TraceSession, ensure_target_running,
};

//! Sessions: one subscriber, at most one process, explicit lifecycle.
//!
//! - [`TraceSession`]: readiness precondition, then a streamed tracer
//! - [`EnumerationSession`]: bounded run returning one JSON payload
//! - [`GenericStreamSession`]: device logs and ad-hoc commands
//!
//! All of them register with a [`SessionRegistry`] for their whole life.

mod enumeration;
mod generic;
mod manager;
mod readiness;
mod registry;
mod stream;
mod trace;

pub use enumeration::EnumerationSession;
pub use generic::{COMMAND_LABEL, GenericStreamSession, LOGCAT_LABEL};
pub use manager::SessionManager;
pub use readiness::{Readiness, ensure_target_running};
pub use registry::{SessionRegistry, SessionTicket};
pub use stream::{StreamOutcome, StreamSession};
pub use trace::{TRACE_LABEL, TraceSession};

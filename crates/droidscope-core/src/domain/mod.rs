//! Domain types shared by every session kind.

mod command;
mod device;
mod event;
mod line;
mod session;

pub use command::{CommandSpec, LogLevel, LogcatFilter, TraceRequest};
pub use device::{Device, InstalledApp, RunningProcess};
pub use event::{ExitReport, ExitVerb, StreamEvent};
pub use line::{Line, Origin};
pub use session::{SessionId, SessionKind, SessionState, SessionSummary};

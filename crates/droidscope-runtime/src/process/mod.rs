//! Tool process ownership and output streaming.
//!
//! # Structure
//!
//! - `ProcessHandle` - sole owner of one spawned process and its pipes
//! - `spawn_stream_reader` - per-pipe reader task feeding a `LineMultiplexer`
//! - `shutdown_child` - SIGTERM, grace period, SIGKILL, reap

mod handle;
pub mod shutdown;
mod stream;

pub use handle::{Liveness, ProcessEvent, ProcessHandle};
pub use shutdown::shutdown_child;

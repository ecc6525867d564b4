//! Driving a spawned process into an event sink.

use std::time::Duration;

use droidscope_core::{
    CommandSpec, EventSink, ExitReport, ExitVerb, SessionError, SessionId, SessionState,
    StreamEvent,
};
use tracing::{debug, info, warn};

use super::registry::SessionTicket;
use crate::process::{ProcessEvent, ProcessHandle};

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The process exited on its own with this code.
    Closed(Option<i32>),
    /// The session was cancelled through the registry.
    Cancelled,
    /// The subscriber went away.
    Disconnected,
}

/// A session whose process is running and ready to stream.
///
/// Construction spawns the process, so any spawn failure surfaces before a
/// subscriber is attached. [`run`](Self::run) then forwards every line to
/// the sink until the process exits, the subscriber disconnects, or the
/// session is cancelled.
#[derive(Debug)]
pub struct StreamSession {
    ticket: SessionTicket,
    handle: ProcessHandle,
    label: String,
    verb: ExitVerb,
}

impl StreamSession {
    /// Spawn `spec` for a ticket that is in `Idle` or `Precondition`.
    pub fn start(
        mut ticket: SessionTicket,
        spec: CommandSpec,
        label: impl Into<String>,
        kill_grace: Duration,
    ) -> Result<Self, SessionError> {
        ticket.advance(SessionState::Spawning)?;
        let handle = match ProcessHandle::spawn(spec, kill_grace) {
            Ok(handle) => handle,
            Err(e) => {
                ticket.fail(&e);
                return Err(e);
            }
        };
        ticket.advance(SessionState::Streaming)?;

        let label = label.into();
        info!(
            session_id = %ticket.id(),
            pid = ?handle.pid(),
            command = %handle.spec(),
            "{label} stream started"
        );
        Ok(Self {
            ticket,
            handle,
            label,
            verb: ExitVerb::Closed,
        })
    }

    /// Use `verb` when announcing the exit.
    #[must_use]
    pub const fn with_verb(mut self, verb: ExitVerb) -> Self {
        self.verb = verb;
        self
    }

    pub const fn id(&self) -> SessionId {
        self.ticket.id()
    }

    pub const fn pid(&self) -> Option<u32> {
        self.handle.pid()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Forward process output to `sink` until the stream ends.
    ///
    /// Stdout and stderr lines are delivered in the order they are read. When
    /// the process exits, one final exit event follows the last line. On
    /// cancellation the process is killed and a terminated event is sent; on
    /// disconnect it is killed and nothing more is sent.
    pub async fn run(mut self, sink: &dyn EventSink) -> StreamOutcome {
        let cancel = self.ticket.cancel_token().clone();

        let outcome = loop {
            tokio::select! {
                biased;

                () = sink.closed() => break StreamOutcome::Disconnected,
                () = cancel.cancelled() => break StreamOutcome::Cancelled,
                event = self.handle.next_event() => match event {
                    Some(ProcessEvent::Line(line)) => {
                        if sink.send(StreamEvent::Line(line)).await.is_err() {
                            break StreamOutcome::Disconnected;
                        }
                    }
                    Some(ProcessEvent::Exited(code)) => {
                        let report = ExitReport::new(&self.label, code).with_verb(self.verb);
                        if sink.send(StreamEvent::Exit(report)).await.is_err() {
                            debug!(session_id = %self.id(), "subscriber gone before exit event");
                        }
                        break StreamOutcome::Closed(code);
                    }
                    // Only reachable if the handle was killed elsewhere
                    None => break StreamOutcome::Cancelled,
                },
            }
        };

        match outcome {
            StreamOutcome::Closed(code) => {
                info!(session_id = %self.id(), ?code, "{} stream closed", self.label);
                self.finish(SessionState::Closed { code });
            }
            StreamOutcome::Cancelled => {
                self.handle.kill().await;
                let terminated = StreamEvent::Terminated {
                    label: self.label.clone(),
                };
                let _ = sink.send(terminated).await;
                info!(session_id = %self.id(), "{} stream cancelled", self.label);
                self.finish(SessionState::Killed);
            }
            StreamOutcome::Disconnected => {
                self.handle.kill().await;
                info!(session_id = %self.id(), "subscriber disconnected, {} killed", self.label);
                self.finish(SessionState::Killed);
            }
        }
        outcome
    }

    fn finish(&mut self, state: SessionState) {
        if let Err(e) = self.ticket.advance(state) {
            warn!(session_id = %self.id(), error = %e, "unexpected session transition");
        }
    }
}

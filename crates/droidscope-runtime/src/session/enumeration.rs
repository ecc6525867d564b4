//! Bounded method enumeration.
//!
//! The enumeration script is loaded into the target and prints a JSON array
//! between two sentinel markers. The attached tool never exits on its own,
//! so it is killed once the timeout elapses and whatever it printed is
//! parsed.

use droidscope_core::{
    CommandSpec, Line, SessionError, SessionState, ToolConfig, extract_payload,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::registry::SessionTicket;
use crate::process::{ProcessEvent, ProcessHandle};

/// A one-shot enumeration against a named target.
#[derive(Debug)]
pub struct EnumerationSession {
    ticket: SessionTicket,
    target: String,
}

impl EnumerationSession {
    pub fn new(ticket: SessionTicket, target: impl Into<String>) -> Self {
        Self {
            ticket,
            target: target.into(),
        }
    }

    /// Run the enumeration and return the parsed payload.
    ///
    /// Stdout is accumulated; stderr lines are logged and discarded. The
    /// process is killed when `tools.enumeration_timeout` elapses or the
    /// session is cancelled. Dropping the returned future kills it too.
    pub async fn run(mut self, tools: &ToolConfig) -> Result<Vec<Value>, SessionError> {
        if self.target.trim().is_empty() {
            let err = SessionError::MissingParameter("process");
            self.ticket.fail(&err);
            return Err(err);
        }

        self.ticket.advance(SessionState::Spawning)?;
        let spec = CommandSpec::enumeration(tools, &self.target);
        let mut handle = match ProcessHandle::spawn(spec, tools.kill_grace) {
            Ok(handle) => handle,
            Err(e) => {
                self.ticket.fail(&e);
                return Err(e);
            }
        };
        self.ticket.advance(SessionState::Streaming)?;
        debug!(session_id = %self.ticket.id(), target = %self.target, "enumeration started");

        let cancel = self.ticket.cancel_token().clone();
        let deadline = tokio::time::sleep(tools.enumeration_timeout);
        tokio::pin!(deadline);

        let mut output = String::new();
        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    handle.kill().await;
                    self.ticket.advance(SessionState::Killed)?;
                    return Err(SessionError::Cancelled);
                }
                () = &mut deadline => {
                    info!(
                        session_id = %self.ticket.id(),
                        timeout = ?tools.enumeration_timeout,
                        "enumeration timed out, killing"
                    );
                    for line in handle.kill_and_drain().await {
                        collect(&mut output, line);
                    }
                    self.ticket.advance(SessionState::Killed)?;
                    break;
                }
                event = handle.next_event() => match event {
                    Some(ProcessEvent::Line(line)) => collect(&mut output, line),
                    Some(ProcessEvent::Exited(code)) => {
                        debug!(session_id = %self.ticket.id(), ?code, "enumeration exited");
                        self.ticket.advance(SessionState::Closed { code })?;
                        break;
                    }
                    None => break,
                },
            }
        }

        extract_payload(&output, &tools.markers)
    }
}

fn collect(output: &mut String, line: Line) {
    if line.is_error() {
        warn!(line = %line.text, "enumeration stderr");
    } else {
        output.push_str(&line.text);
        output.push('\n');
    }
}

//! Streams with no precondition: device logs and ad-hoc shell commands.

use droidscope_core::{CommandSpec, ExitVerb, LogcatFilter, SessionError, ToolConfig};

use super::registry::SessionTicket;
use super::stream::StreamSession;

pub const LOGCAT_LABEL: &str = "Logcat";
pub const COMMAND_LABEL: &str = "Process";

/// A stream that is spawned as soon as it is requested.
#[derive(Debug)]
pub struct GenericStreamSession {
    ticket: SessionTicket,
    spec: CommandSpec,
    label: &'static str,
    verb: ExitVerb,
}

impl GenericStreamSession {
    /// Continuous device log for `device_id`.
    pub fn logcat(
        mut ticket: SessionTicket,
        tools: &ToolConfig,
        device_id: Option<&str>,
        filter: &LogcatFilter,
    ) -> Result<Self, SessionError> {
        let Some(device_id) = device_id.map(str::trim).filter(|id| !id.is_empty()) else {
            let err = SessionError::MissingParameter("id");
            ticket.fail(&err);
            return Err(err);
        };
        Ok(Self {
            spec: CommandSpec::logcat(tools, device_id, filter),
            ticket,
            label: LOGCAT_LABEL,
            verb: ExitVerb::Closed,
        })
    }

    /// Arbitrary command line run through the configured shell.
    ///
    /// The line is passed to the shell verbatim.
    pub fn command(
        mut ticket: SessionTicket,
        tools: &ToolConfig,
        line: &str,
    ) -> Result<Self, SessionError> {
        if line.trim().is_empty() {
            let err = SessionError::MissingParameter("command");
            ticket.fail(&err);
            return Err(err);
        }
        Ok(Self {
            spec: CommandSpec::shell(&tools.shell, line),
            ticket,
            label: COMMAND_LABEL,
            verb: ExitVerb::Exited,
        })
    }

    pub const fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Spawn the process.
    pub fn start(self, tools: &ToolConfig) -> Result<StreamSession, SessionError> {
        StreamSession::start(self.ticket, self.spec, self.label, tools.kill_grace)
            .map(|session| session.with_verb(self.verb))
    }
}

//! Trace sessions: readiness check, then a streamed `frida-trace`.

use droidscope_core::{
    DeviceBridgePort, EventSink, SessionError, SessionState, ToolConfig, TraceRequest,
};
use tracing::info;

use super::readiness::{Readiness, ensure_target_running};
use super::registry::SessionTicket;
use super::stream::{StreamOutcome, StreamSession};

/// Label used in the exit event of a trace stream.
pub const TRACE_LABEL: &str = "frida-trace";

/// A trace that has been requested but not yet attached.
#[derive(Debug)]
pub struct TraceSession {
    ticket: SessionTicket,
    request: TraceRequest,
}

impl TraceSession {
    pub const fn new(ticket: SessionTicket, request: TraceRequest) -> Self {
        Self { ticket, request }
    }

    pub const fn request(&self) -> &TraceRequest {
        &self.request
    }

    /// Make sure the target is running, then spawn the tracer.
    ///
    /// Every precondition failure is returned here, before any tracer
    /// process exists. Cancelling the session while the precondition is in
    /// progress abandons it.
    pub async fn prepare(
        mut self,
        bridge: &dyn DeviceBridgePort,
        tools: &ToolConfig,
    ) -> Result<StreamSession, SessionError> {
        if let Err(e) = self.request.validate() {
            self.ticket.fail(&e);
            return Err(e);
        }
        self.ticket.advance(SessionState::Precondition)?;

        let cancel = self.ticket.cancel_token().clone();
        let readiness = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.ticket.advance(SessionState::Killed)?;
                return Err(SessionError::Cancelled);
            }
            result = ensure_target_running(
                bridge,
                self.request.device_id.as_deref(),
                &self.request.target,
                tools.launch_settle,
            ) => result,
        };

        match readiness {
            Ok(Readiness::AlreadyRunning) => {}
            Ok(Readiness::Launched { identifier }) => {
                info!(
                    session_id = %self.ticket.id(),
                    target = %self.request.target,
                    %identifier,
                    "target launched for tracing"
                );
            }
            Err(e) => {
                self.ticket.fail(&e);
                return Err(e);
            }
        }

        let spec = self.request.tracer_command(tools);
        StreamSession::start(self.ticket, spec, TRACE_LABEL, tools.kill_grace)
    }

    /// Prepare the trace and stream it into `sink`.
    pub async fn run(
        self,
        bridge: &dyn DeviceBridgePort,
        tools: &ToolConfig,
        sink: &dyn EventSink,
    ) -> Result<StreamOutcome, SessionError> {
        let session = self.prepare(bridge, tools).await?;
        Ok(session.run(sink).await)
    }
}

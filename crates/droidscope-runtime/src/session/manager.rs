//! Entry point the HTTP layer talks to.

use std::sync::Arc;

use droidscope_core::{
    BridgeError, Device, DeviceBridgePort, InstalledApp, LogcatFilter, SessionError, SessionId,
    SessionKind, SessionSummary, ToolConfig, TraceRequest,
};
use serde_json::Value;

use super::enumeration::EnumerationSession;
use super::generic::GenericStreamSession;
use super::registry::SessionRegistry;
use super::stream::StreamSession;
use super::trace::TraceSession;

/// Opens sessions against one device bridge and tool configuration.
///
/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct SessionManager {
    bridge: Arc<dyn DeviceBridgePort>,
    tools: ToolConfig,
    registry: SessionRegistry,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("tools", &self.tools)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(bridge: Arc<dyn DeviceBridgePort>, tools: ToolConfig) -> Self {
        let registry = SessionRegistry::with_exclusive_traces(tools.exclusive_traces);
        Self {
            bridge,
            tools,
            registry,
        }
    }

    pub const fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Run the trace precondition and spawn the tracer.
    ///
    /// Fails without spawning anything if the target is neither running nor
    /// installed, or if launching it fails.
    pub async fn start_trace(&self, request: TraceRequest) -> Result<StreamSession, SessionError> {
        request.validate()?;
        let ticket = self.registry.open(
            SessionKind::Trace,
            request.device_id.as_deref(),
            Some(&request.target),
        )?;
        TraceSession::new(ticket, request)
            .prepare(self.bridge.as_ref(), &self.tools)
            .await
    }

    /// Enumerate the target's classes and return the parsed payload.
    pub async fn enumerate(&self, target: &str) -> Result<Vec<Value>, SessionError> {
        let ticket = self
            .registry
            .open(SessionKind::Enumeration, None, Some(target))?;
        EnumerationSession::new(ticket, target)
            .run(&self.tools)
            .await
    }

    /// Spawn a device log stream.
    pub fn stream_logs(
        &self,
        device_id: Option<&str>,
        filter: &LogcatFilter,
    ) -> Result<StreamSession, SessionError> {
        let ticket = self
            .registry
            .open(SessionKind::GenericStream, device_id, None)?;
        GenericStreamSession::logcat(ticket, &self.tools, device_id, filter)?.start(&self.tools)
    }

    /// Spawn an arbitrary shell command.
    pub fn run_command(&self, line: &str) -> Result<StreamSession, SessionError> {
        let ticket = self
            .registry
            .open(SessionKind::GenericStream, None, Some(line))?;
        GenericStreamSession::command(ticket, &self.tools, line)?.start(&self.tools)
    }

    pub fn sessions(&self) -> Vec<SessionSummary> {
        self.registry.list()
    }

    pub fn session(&self, id: SessionId) -> Option<SessionSummary> {
        self.registry.get(id)
    }

    /// Cancel a session; `false` if it is not active.
    pub fn cancel(&self, id: SessionId) -> bool {
        self.registry.cancel(id)
    }

    /// Installed applications, for picking a trace target.
    pub async fn installed_applications(
        &self,
        device_id: Option<&str>,
    ) -> Result<Vec<InstalledApp>, BridgeError> {
        self.bridge.list_installed_applications(device_id).await
    }

    pub async fn devices(&self) -> Result<Vec<Device>, BridgeError> {
        self.bridge.list_devices().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBridge;

    fn manager(bridge: MockBridge, tools: ToolConfig) -> SessionManager {
        SessionManager::new(Arc::new(bridge), tools)
    }

    #[tokio::test]
    async fn failed_trace_leaves_registry_empty() {
        let manager = manager(MockBridge::new(), ToolConfig::default());
        let err = manager
            .start_trace(TraceRequest::new("Example"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::TargetNotInstalled { .. }));
        assert!(manager.sessions().is_empty());
    }

    #[tokio::test]
    async fn blank_trace_target_never_registers() {
        let manager = manager(MockBridge::new(), ToolConfig::default());
        let err = manager
            .start_trace(TraceRequest::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingParameter("process")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exclusive_traces_reject_duplicates() {
        // `true` stands in for the tracer; the entry lives as long as the session
        let tools = ToolConfig::default()
            .with_frida_trace("true")
            .with_exclusive_traces(true);
        let manager = manager(MockBridge::new().running("Example"), tools);
        let request = TraceRequest::new("Example").with_device("emulator-5554");

        let first = manager.start_trace(request.clone()).await.unwrap();
        let err = manager.start_trace(request).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyActive { .. }));

        let sessions = manager.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, first.id());
        drop(first);
        assert!(manager.sessions().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn active_stream_is_listed_and_cancellable() {
        let manager = manager(MockBridge::new(), ToolConfig::default());
        let session = manager.run_command("sleep 30").unwrap();
        let id = session.id();

        let listed = manager.session(id).unwrap();
        assert_eq!(listed.kind, SessionKind::GenericStream);
        assert_eq!(listed.target.as_deref(), Some("sleep 30"));

        assert!(manager.cancel(id));
        let sink = droidscope_core::RecordingSink::new();
        session.run(&sink).await;
        assert_eq!(sink.rendered(), ["Process terminated"]);
        assert!(!manager.cancel(id));
    }
}

//! Trace readiness: make sure the target is running before attaching.
//!
//! A tracer that attaches by process name fails outright when nothing by
//! that name is running, so an app that is installed but closed is launched
//! first. An app that is already running is left alone.

use std::time::Duration;

use droidscope_core::{DeviceBridgePort, SessionError};
use tracing::{debug, info};

/// How the precondition was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The target was already running; nothing was launched.
    AlreadyRunning,
    /// The target was launched using this identifier.
    Launched { identifier: String },
}

/// Ensure a process named `target` is running on the device.
///
/// No process is spawned by this function other than the bridge's own
/// one-shot queries, which complete before it returns.
pub async fn ensure_target_running(
    bridge: &dyn DeviceBridgePort,
    device_id: Option<&str>,
    target: &str,
    settle: Duration,
) -> Result<Readiness, SessionError> {
    let running = bridge.list_running_processes(device_id).await?;
    if running.iter().any(|p| p.name == target) {
        debug!(%target, "trace target already running");
        return Ok(Readiness::AlreadyRunning);
    }

    let installed = bridge.list_installed_applications(device_id).await?;
    let identifier = installed
        .into_iter()
        .find(|app| app.name == target)
        .map(|app| app.identifier)
        .filter(|identifier| !identifier.is_empty())
        .ok_or_else(|| SessionError::TargetNotInstalled {
            target: target.to_string(),
        })?;

    bridge
        .launch_application(device_id, &identifier)
        .await
        .map_err(|e| SessionError::LaunchFailed {
            identifier: identifier.clone(),
            reason: e.to_string(),
        })?;

    info!(%target, %identifier, "launched trace target");
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    Ok(Readiness::Launched { identifier })
}

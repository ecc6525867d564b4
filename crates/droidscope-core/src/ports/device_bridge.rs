//! Device-bridge collaborator port.
//!
//! Sessions only need a handful of one-shot queries from the device; how
//! they are answered (`adb`, `frida-ps`, a remote agent) is an adapter
//! concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Device, InstalledApp, RunningProcess};
use crate::error::BridgeError;

/// Captured result of a command run to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// One-shot queries and commands against a connected device.
///
/// `device_id` of `None` means "the single USB device".
#[async_trait]
pub trait DeviceBridgePort: Send + Sync {
    /// Processes currently running on the device.
    async fn list_running_processes(
        &self,
        device_id: Option<&str>,
    ) -> Result<Vec<RunningProcess>, BridgeError>;

    /// Installed applications with their launch identifiers.
    async fn list_installed_applications(
        &self,
        device_id: Option<&str>,
    ) -> Result<Vec<InstalledApp>, BridgeError>;

    /// Start an application by identifier. Returns once the launch command
    /// has completed; it does not wait for the app to be ready.
    async fn launch_application(
        &self,
        device_id: Option<&str>,
        identifier: &str,
    ) -> Result<(), BridgeError>;

    /// Run a command line to completion and capture its output.
    async fn run_one_shot(&self, command: &str) -> Result<CommandOutput, BridgeError>;

    /// Devices known to the bridge.
    async fn list_devices(&self) -> Result<Vec<Device>, BridgeError>;
}

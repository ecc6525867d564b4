//! Device-bridge implementation over the stock command-line tools.
//!
//! `frida-ps` answers the process and application queries (it speaks JSON
//! with `-j`), `adb` launches apps and lists devices.

mod parse;

use std::process::Stdio;

use async_trait::async_trait;
use droidscope_core::{
    BridgeError, CommandOutput, CommandSpec, Device, DeviceBridgePort, InstalledApp,
    RunningProcess, ToolConfig,
};
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, warn};

pub use parse::{launch_failure, parse_device_list};

/// Launcher category used to start an app's main activity.
const LAUNCHER_CATEGORY: &str = "android.intent.category.LAUNCHER";

/// [`DeviceBridgePort`] backed by `adb` and `frida-ps`.
#[derive(Debug, Clone)]
pub struct ToolBridge {
    tools: ToolConfig,
}

impl ToolBridge {
    pub const fn new(tools: ToolConfig) -> Self {
        Self { tools }
    }

    pub const fn tools(&self) -> &ToolConfig {
        &self.tools
    }

    /// Run `spec` to completion, capturing both pipes.
    async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput, BridgeError> {
        debug!(command = %spec, "running one-shot command");
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| BridgeError::Io {
                tool: spec.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    /// Run `spec`, require success, and parse stdout as JSON.
    async fn json<T: DeserializeOwned>(&self, spec: &CommandSpec) -> Result<T, BridgeError> {
        let output = self.output(spec).await?;
        if !output.success() {
            return Err(BridgeError::CommandFailed {
                tool: spec.program.clone(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        serde_json::from_str(output.stdout.trim()).map_err(|e| BridgeError::InvalidOutput {
            tool: spec.program.clone(),
            reason: e.to_string(),
        })
    }

    fn adb(&self, device_id: Option<&str>) -> CommandSpec {
        let spec = CommandSpec::new(&self.tools.adb);
        match device_id.filter(|id| !id.is_empty()) {
            Some(id) => spec.args(["-s", id]),
            None => spec,
        }
    }
}

#[async_trait]
impl DeviceBridgePort for ToolBridge {
    async fn list_running_processes(
        &self,
        _device_id: Option<&str>,
    ) -> Result<Vec<RunningProcess>, BridgeError> {
        let spec = CommandSpec::new(&self.tools.frida_ps).args(["-Ua", "-j"]);
        self.json(&spec).await
    }

    async fn list_installed_applications(
        &self,
        _device_id: Option<&str>,
    ) -> Result<Vec<InstalledApp>, BridgeError> {
        let spec = CommandSpec::new(&self.tools.frida_ps).args(["-Uai", "-j"]);
        self.json(&spec).await
    }

    async fn launch_application(
        &self,
        device_id: Option<&str>,
        identifier: &str,
    ) -> Result<(), BridgeError> {
        let spec = self.adb(device_id).args([
            "shell",
            "monkey",
            "-p",
            identifier,
            "-c",
            LAUNCHER_CATEGORY,
            "1",
        ]);
        let output = self.output(&spec).await?;

        if let Some(reason) = launch_failure(&output) {
            warn!(%identifier, %reason, "launch command failed");
            return Err(BridgeError::CommandFailed {
                tool: spec.program,
                code: output.exit_code,
                stderr: reason,
            });
        }
        debug!(%identifier, "launch command completed");
        Ok(())
    }

    async fn run_one_shot(&self, command: &str) -> Result<CommandOutput, BridgeError> {
        self.output(&CommandSpec::shell(&self.tools.shell, command))
            .await
    }

    async fn list_devices(&self) -> Result<Vec<Device>, BridgeError> {
        let spec = self.adb(None).arg("devices");
        let output = self.output(&spec).await?;
        if !output.success() {
            return Err(BridgeError::CommandFailed {
                tool: spec.program,
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(parse_device_list(&output.stdout))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_one_shot_captures_both_pipes() {
        let bridge = ToolBridge::new(ToolConfig::default());
        let output = bridge
            .run_one_shot("echo out; echo err >&2; exit 4")
            .await
            .unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code, Some(4));
    }

    #[tokio::test]
    async fn missing_tool_is_io_error() {
        let bridge = ToolBridge::new(ToolConfig::default().with_frida_ps("/nonexistent/frida-ps"));
        let err = bridge.list_running_processes(None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Io { .. }));
    }

    #[tokio::test]
    async fn non_json_output_is_invalid() {
        // `echo` stands in for frida-ps and prints its arguments
        let bridge = ToolBridge::new(ToolConfig::default().with_frida_ps("echo"));
        let err = bridge.list_installed_applications(None).await.unwrap_err();
        match err {
            BridgeError::InvalidOutput { tool, .. } => assert_eq!(tool, "echo"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn launch_uses_monkey_with_device() {
        // `echo` stands in for adb so the exact argv comes back on stdout
        let bridge = ToolBridge::new(ToolConfig::default().with_adb("echo"));
        let spec = bridge.adb(Some("emulator-5554")).arg("devices");
        assert_eq!(spec.args, ["-s", "emulator-5554", "devices"]);

        bridge
            .launch_application(Some("emulator-5554"), "com.example.app")
            .await
            .unwrap();
    }
}

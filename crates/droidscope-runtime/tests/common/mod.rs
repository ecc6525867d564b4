//! Shared fixtures for runtime integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use droidscope_core::{
    BridgeError, CommandOutput, Device, DeviceBridgePort, InstalledApp, RunningProcess,
};

/// Device bridge with a fixed device state that records launches.
pub struct MockDevice {
    pub running: Mutex<Vec<RunningProcess>>,
    pub installed: Vec<InstalledApp>,
    pub launches: Mutex<Vec<String>>,
}

impl MockDevice {
    pub fn with_installed(apps: &[(&str, &str)]) -> Self {
        Self {
            running: Mutex::new(Vec::new()),
            installed: apps
                .iter()
                .map(|(name, id)| InstalledApp::new(*name, *id))
                .collect(),
            launches: Mutex::new(Vec::new()),
        }
    }

    pub fn launches(&self) -> Vec<String> {
        self.launches.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceBridgePort for MockDevice {
    async fn list_running_processes(
        &self,
        _device_id: Option<&str>,
    ) -> Result<Vec<RunningProcess>, BridgeError> {
        Ok(self.running.lock().unwrap().clone())
    }

    async fn list_installed_applications(
        &self,
        _device_id: Option<&str>,
    ) -> Result<Vec<InstalledApp>, BridgeError> {
        Ok(self.installed.clone())
    }

    async fn launch_application(
        &self,
        _device_id: Option<&str>,
        identifier: &str,
    ) -> Result<(), BridgeError> {
        self.launches.lock().unwrap().push(identifier.to_string());
        // A launched app shows up as running under its display name
        if let Some(app) = self.installed.iter().find(|a| a.identifier == identifier) {
            self.running
                .lock()
                .unwrap()
                .push(RunningProcess::named(app.name.clone()));
        }
        Ok(())
    }

    async fn run_one_shot(&self, _command: &str) -> Result<CommandOutput, BridgeError> {
        Ok(CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }

    async fn list_devices(&self) -> Result<Vec<Device>, BridgeError> {
        Ok(Vec::new())
    }
}

/// Write an executable shell script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "#!/bin/sh\n{body}").unwrap();
    drop(file);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

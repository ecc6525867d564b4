//! In-memory device bridge for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use droidscope_core::{
    BridgeError, CommandOutput, Device, DeviceBridgePort, InstalledApp, RunningProcess,
};

/// Bridge with canned query results that records launches.
#[derive(Default)]
pub struct MockBridge {
    running: Vec<RunningProcess>,
    installed: Vec<InstalledApp>,
    query_error: Option<String>,
    launch_error: Option<String>,
    pub launches: Mutex<Vec<(Option<String>, String)>>,
    pub installed_queries: Mutex<usize>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running(mut self, name: &str) -> Self {
        self.running.push(RunningProcess::named(name));
        self
    }

    pub fn installed(mut self, name: &str, identifier: &str) -> Self {
        self.installed.push(InstalledApp::new(name, identifier));
        self
    }

    pub fn failing_queries(mut self, reason: &str) -> Self {
        self.query_error = Some(reason.to_string());
        self
    }

    pub fn failing_launch(mut self, reason: &str) -> Self {
        self.launch_error = Some(reason.to_string());
        self
    }

    pub fn launched(&self) -> Vec<(Option<String>, String)> {
        self.launches.lock().unwrap().clone()
    }

    fn query_failure(&self) -> Option<BridgeError> {
        self.query_error
            .as_ref()
            .map(|reason| BridgeError::InvalidOutput {
                tool: "frida-ps".into(),
                reason: reason.clone(),
            })
    }
}

#[async_trait]
impl DeviceBridgePort for MockBridge {
    async fn list_running_processes(
        &self,
        _device_id: Option<&str>,
    ) -> Result<Vec<RunningProcess>, BridgeError> {
        match self.query_failure() {
            Some(err) => Err(err),
            None => Ok(self.running.clone()),
        }
    }

    async fn list_installed_applications(
        &self,
        _device_id: Option<&str>,
    ) -> Result<Vec<InstalledApp>, BridgeError> {
        *self.installed_queries.lock().unwrap() += 1;
        match self.query_failure() {
            Some(err) => Err(err),
            None => Ok(self.installed.clone()),
        }
    }

    async fn launch_application(
        &self,
        device_id: Option<&str>,
        identifier: &str,
    ) -> Result<(), BridgeError> {
        self.launches
            .lock()
            .unwrap()
            .push((device_id.map(str::to_string), identifier.to_string()));
        match &self.launch_error {
            Some(reason) => Err(BridgeError::CommandFailed {
                tool: "adb".into(),
                code: Some(1),
                stderr: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn run_one_shot(&self, _command: &str) -> Result<CommandOutput, BridgeError> {
        Ok(CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }

    async fn list_devices(&self) -> Result<Vec<Device>, BridgeError> {
        Ok(vec![Device {
            id: "emulator-5554".into(),
            status: "device".into(),
        }])
    }
}

/// Whether `pid` is a live process. Zombies count as gone.
#[cfg(target_os = "linux")]
pub fn process_running(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    // The state field follows the parenthesised command name
    stat.rsplit_once(')')
        .and_then(|(_, rest)| rest.trim_start().chars().next())
        .is_some_and(|state| state != 'Z')
}

/// Poll for up to two seconds until `pid` is gone.
#[cfg(target_os = "linux")]
pub async fn wait_until_gone(pid: u32) -> bool {
    for _ in 0..40 {
        if !process_running(pid) {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    !process_running(pid)
}

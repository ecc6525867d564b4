//! Shared fixtures for router tests.

#![allow(dead_code)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use droidscope_axum::{AxumContext, CorsConfig, create_router};
use droidscope_core::{
    BridgeError, CommandOutput, Device, DeviceBridgePort, InstalledApp, RunningProcess,
    ToolConfig,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Device bridge with canned state.
#[derive(Default)]
pub struct FakeDevice {
    pub running: Vec<RunningProcess>,
    pub installed: Vec<InstalledApp>,
    pub launches: Mutex<Vec<String>>,
}

impl FakeDevice {
    pub fn installed(apps: &[(&str, &str)]) -> Self {
        Self {
            installed: apps
                .iter()
                .map(|(name, id)| InstalledApp::new(*name, *id))
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl DeviceBridgePort for FakeDevice {
    async fn list_running_processes(
        &self,
        _device_id: Option<&str>,
    ) -> Result<Vec<RunningProcess>, BridgeError> {
        Ok(self.running.clone())
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
        Ok(vec![Device {
            id: "emulator-5554".into(),
            status: "device".into(),
        }])
    }
}

pub fn app(device: Arc<FakeDevice>, tools: ToolConfig) -> Router {
    create_router(AxumContext::new(device, tools), &CorsConfig::AllowAll)
}

pub async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

/// Collect a body to completion; streams end when their session does.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
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

//! Records returned by the device-bridge collaborator.

use serde::{Deserialize, Serialize};

/// A device known to the bridge (`adb devices`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub status: String,
}

/// A process currently running on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningProcess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub name: String,
}

impl RunningProcess {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            pid: None,
            name: name.into(),
        }
    }
}

/// An installed application and the identifier used to launch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub identifier: String,
}

impl InstalledApp {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            pid: None,
            name: name.into(),
            identifier: identifier.into(),
        }
    }
}

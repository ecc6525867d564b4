//! Tool locations and timing knobs.
//!
//! None of the durations here have a universally right value: slow devices
//! need a longer enumeration window, some apps need a moment after launch
//! before a tracer can attach. They are configuration, not constants.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::enumeration::PayloadMarkers;

/// Default hard limit for an enumeration run.
pub const DEFAULT_ENUMERATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Default time between SIGTERM and SIGKILL when stopping a process.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(2);

/// Default path of the class-enumeration script loaded into `frida`.
pub const DEFAULT_ENUMERATION_SCRIPT: &str = "scripts/enum-classes.js";

/// Where the external tools live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
    /// Device bridge (`adb`).
    pub adb: String,
    /// Instrumentation REPL used for enumeration (`frida`).
    pub frida: String,
    /// Tracer (`frida-trace`).
    pub frida_trace: String,
    /// Process lister (`frida-ps`).
    pub frida_ps: String,
    /// Shell used for arbitrary command lines.
    pub shell: String,
    /// Script that prints the class list between payload markers.
    pub enumeration_script: PathBuf,
    /// Hard limit for an enumeration run before the process is killed.
    #[serde(with = "duration_ms")]
    pub enumeration_timeout: Duration,
    /// Grace period between SIGTERM and SIGKILL.
    #[serde(with = "duration_ms")]
    pub kill_grace: Duration,
    /// Pause after launching a trace target, before the tracer spawns.
    #[serde(with = "duration_ms")]
    pub launch_settle: Duration,
    /// Sentinels around the enumeration payload.
    pub markers: PayloadMarkers,
    /// Allow at most one active trace per (device, target).
    pub exclusive_traces: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            adb: "adb".to_string(),
            frida: "frida".to_string(),
            frida_trace: "frida-trace".to_string(),
            frida_ps: "frida-ps".to_string(),
            shell: "sh".to_string(),
            enumeration_script: PathBuf::from(DEFAULT_ENUMERATION_SCRIPT),
            enumeration_timeout: DEFAULT_ENUMERATION_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
            launch_settle: Duration::ZERO,
            markers: PayloadMarkers::default(),
            exclusive_traces: false,
        }
    }
}

impl ToolConfig {
    #[must_use]
    pub fn with_adb(mut self, adb: impl Into<String>) -> Self {
        self.adb = adb.into();
        self
    }

    #[must_use]
    pub fn with_frida(mut self, frida: impl Into<String>) -> Self {
        self.frida = frida.into();
        self
    }

    #[must_use]
    pub fn with_frida_trace(mut self, frida_trace: impl Into<String>) -> Self {
        self.frida_trace = frida_trace.into();
        self
    }

    #[must_use]
    pub fn with_frida_ps(mut self, frida_ps: impl Into<String>) -> Self {
        self.frida_ps = frida_ps.into();
        self
    }

    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    #[must_use]
    pub fn with_enumeration_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.enumeration_script = path.into();
        self
    }

    #[must_use]
    pub const fn with_enumeration_timeout(mut self, timeout: Duration) -> Self {
        self.enumeration_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    #[must_use]
    pub const fn with_launch_settle(mut self, settle: Duration) -> Self {
        self.launch_settle = settle;
        self
    }

    #[must_use]
    pub const fn with_exclusive_traces(mut self, exclusive: bool) -> Self {
        self.exclusive_traces = exclusive;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

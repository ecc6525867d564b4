//! Command lines for the tools a session drives.
//!
//! Building argument vectors is pure and lives here so the exact shape of
//! every invocation can be tested without spawning anything.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ToolConfig;
use crate::error::SessionError;

/// Program plus arguments, passed to the OS without a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run `line` through `shell -c`. The line is not sanitised.
    pub fn shell(shell: &str, line: &str) -> Self {
        Self::new(shell).arg("-c").arg(line)
    }

    /// Method enumeration: attach `frida` with the payload script loaded.
    pub fn enumeration(tools: &ToolConfig, target: &str) -> Self {
        Self::new(&tools.frida).args([
            "-U".to_string(),
            "-n".to_string(),
            target.to_string(),
            "-l".to_string(),
            path_arg(&tools.enumeration_script),
            "--runtime=v8".to_string(),
        ])
    }

    /// Continuous device log: `adb -s <device> logcat <filterspecs>`.
    pub fn logcat(tools: &ToolConfig, device_id: &str, filter: &LogcatFilter) -> Self {
        Self::new(&tools.adb)
            .args(["-s", device_id, "logcat"])
            .args(filter.filterspecs())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Parameters of a trace session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRequest {
    /// Name of the process to attach to.
    pub target: String,
    /// Method/class filter, handed to the tracer untouched.
    #[serde(default)]
    pub filter: Option<String>,
    /// Device used for the launch step.
    #[serde(default)]
    pub device_id: Option<String>,
}

impl TraceRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Reject a request without a target before anything is spawned.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.target.trim().is_empty() {
            return Err(SessionError::MissingParameter("process"));
        }
        Ok(())
    }

    /// `frida-trace -U -n <target> [-j <filter>]`
    pub fn tracer_command(&self, tools: &ToolConfig) -> CommandSpec {
        let mut spec =
            CommandSpec::new(&tools.frida_trace).args(["-U", "-n", self.target.as_str()]);
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.is_empty()) {
            spec = spec.arg("-j").arg(filter);
        }
        spec
    }
}

/// Logcat priority, least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "V")]
    Verbose,
    #[serde(rename = "D")]
    Debug,
    #[default]
    #[serde(rename = "I")]
    Info,
    #[serde(rename = "W")]
    Warn,
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "F")]
    Fatal,
}

impl LogLevel {
    pub const fn as_char(self) -> char {
        match self {
            Self::Verbose => 'V',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
            Self::Fatal => 'F',
        }
    }
}

impl FromStr for LogLevel {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "V" | "VERBOSE" => Ok(Self::Verbose),
            "D" | "DEBUG" => Ok(Self::Debug),
            "I" | "INFO" => Ok(Self::Info),
            "W" | "WARN" => Ok(Self::Warn),
            "E" | "ERROR" => Ok(Self::Error),
            "F" | "FATAL" => Ok(Self::Fatal),
            other => Err(SessionError::InvalidParameter {
                name: "level",
                reason: format!("unknown log level '{other}', expected one of V D I W E F"),
            }),
        }
    }
}

/// Tag and severity filter for a log stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogcatFilter {
    pub tag: Option<String>,
    pub level: LogLevel,
}

impl LogcatFilter {
    /// Filterspecs appended after `logcat`.
    ///
    /// With a tag, only that tag is shown at `level` and everything else is
    /// silenced; without one, every tag is shown at `level`.
    pub fn filterspecs(&self) -> Vec<String> {
        let level = self.level.as_char();
        match self.tag.as_deref().filter(|t| !t.is_empty()) {
            Some(tag) => vec![format!("{tag}:{level}"), "*:S".to_string()],
            None => vec![format!("*:{level}")],
        }
    }
}

//! Tool availability checks.
//!
//! Each external tool is probed by running it with its version flag. A tool
//! that cannot be run, or exits non-zero, is reported as missing.

use std::process::{Command, Stdio};

use droidscope_core::ToolConfig;
use serde::Serialize;

/// Availability of one external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStatus {
    /// Role of the tool, e.g. `adb` or `frida-trace`.
    pub name: &'static str,
    /// Program that was probed.
    pub program: String,
    /// First line of the version output, if the tool ran.
    pub version: Option<String>,
}

impl ToolStatus {
    pub const fn is_available(&self) -> bool {
        self.version.is_some()
    }
}

/// Get the version line of a command by running it with `version_flag`.
pub fn get_command_version(cmd: &str, version_flag: &str) -> Option<String> {
    let output = Command::new(cmd)
        .arg(version_flag)
        .stdin(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Some tools print their version on stderr
    let text = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };

    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Probe every configured tool.
pub fn check_tools(tools: &ToolConfig) -> Vec<ToolStatus> {
    let probes: [(&'static str, &str, &str); 4] = [
        // adb takes a subcommand rather than a flag
        ("adb", &tools.adb, "version"),
        ("frida", &tools.frida, "--version"),
        ("frida-trace", &tools.frida_trace, "--version"),
        ("frida-ps", &tools.frida_ps, "--version"),
    ];

    let mut statuses: Vec<_> = probes
        .into_iter()
        .map(|(name, program, flag)| ToolStatus {
            name,
            program: program.to_string(),
            version: get_command_version(program, flag),
        })
        .collect();
    statuses.push(ToolStatus {
        name: "shell",
        program: tools.shell.clone(),
        version: shell_available(&tools.shell),
    });
    statuses
}

fn shell_available(shell: &str) -> Option<String> {
    let status = Command::new(shell)
        .args(["-c", "exit 0"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .ok()?;
    status.success().then(|| "available".to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_has_no_version() {
        assert!(get_command_version("/nonexistent/adb", "version").is_none());
    }

    #[test]
    fn version_is_first_non_empty_line() {
        // `echo` prints its argument back
        assert_eq!(
            get_command_version("echo", "1.2.3").as_deref(),
            Some("1.2.3")
        );
    }

    #[cfg(unix)]
    #[test]
    fn check_tools_reports_every_tool() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let frida = dir.path().join("frida");
        std::fs::write(&frida, "#!/bin/sh\necho\necho 16.5.9\n").unwrap();
        std::fs::set_permissions(&frida, std::fs::Permissions::from_mode(0o755)).unwrap();

        let tools = ToolConfig::default()
            .with_adb("/nonexistent/adb")
            .with_frida(frida.to_string_lossy());
        let statuses = check_tools(&tools);
        let names: Vec<_> = statuses.iter().map(|s| s.name).collect();
        assert_eq!(names, ["adb", "frida", "frida-trace", "frida-ps", "shell"]);

        assert!(!statuses[0].is_available());
        assert_eq!(statuses[1].version.as_deref(), Some("16.5.9"));
        assert!(statuses[4].is_available());
    }
}

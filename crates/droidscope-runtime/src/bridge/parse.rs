//! Parsers for plain-text `adb` output.

use droidscope_core::{CommandOutput, Device};

/// Markers `monkey` prints when it could not start anything.
const MONKEY_FAILURE_MARKERS: &[&str] = &["monkey aborted", "No activities found"];

/// Parse `adb devices` output into device records.
///
/// ```text
/// List of devices attached
/// emulator-5554	device
/// 192.168.1.20:5555	unauthorized
/// ```
pub fn parse_device_list(output: &str) -> Vec<Device> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let id = fields.next()?;
            let status = fields.next().unwrap_or("unknown");
            Some(Device {
                id: id.to_string(),
                status: status.to_string(),
            })
        })
        .collect()
}

/// Why a launch command failed, or `None` if it succeeded.
///
/// `adb shell` does not always propagate the remote exit code, so the
/// output is checked for monkey's own failure messages as well.
pub fn launch_failure(output: &CommandOutput) -> Option<String> {
    let combined = format!("{}\n{}", output.stdout, output.stderr);
    if let Some(marker) = MONKEY_FAILURE_MARKERS
        .iter()
        .find(|marker| combined.contains(**marker))
    {
        return Some(format!("{marker}: {}", combined.trim()));
    }

    if !output.success() {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        return Some(format!(
            "exit code {}: {detail}",
            output
                .exit_code
                .map_or_else(|| "none".to_string(), |c| c.to_string())
        ));
    }

    None
}

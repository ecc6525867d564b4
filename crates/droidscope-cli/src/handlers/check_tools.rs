//! `droidscope check-tools`: report which external tools can be run.

use anyhow::Result;
use droidscope_core::ToolConfig;
use droidscope_runtime::{ToolStatus, check_tools};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BLUE: &str = "\x1b[34m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Probe every configured tool and print a table.
///
/// Returns an error when any tool is missing, so the exit code can be used
/// in scripts.
pub fn execute(tools: &ToolConfig) -> Result<()> {
    println!("{BOLD}{BLUE}Checking external tools...{RESET}\n");
    println!(
        "{}{:<14} {:<10} {:<30} {}{}",
        BOLD, "TOOL", "STATUS", "PROGRAM", "VERSION", RESET
    );
    println!("{}", "=".repeat(85));

    let statuses = check_tools(tools);
    for status in &statuses {
        print_status(status);
    }
    println!("{}", "=".repeat(85));

    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| !s.is_available())
        .map(|s| s.name)
        .collect();

    if missing.is_empty() {
        println!(
            "{GREEN}✓ All tools are available!{RESET} ({}/{})",
            statuses.len(),
            statuses.len()
        );
        if !tools.enumeration_script.exists() {
            println!(
                "{BOLD}note:{RESET} enumeration script {} not found; /frida/methods will fail",
                tools.enumeration_script.display()
            );
        }
        Ok(())
    } else {
        println!(
            "{RED}✗ Missing tools:{RESET} {} ({}/{} available)",
            missing.join(", "),
            statuses.len() - missing.len(),
            statuses.len()
        );
        anyhow::bail!("{} tool(s) missing", missing.len())
    }
}

fn print_status(status: &ToolStatus) {
    let (color, label) = if status.is_available() {
        (GREEN, "found")
    } else {
        (RED, "missing")
    };
    println!(
        "{:<14} {}{:<10}{} {:<30} {}",
        status.name,
        color,
        label,
        RESET,
        status.program,
        status.version.as_deref().unwrap_or("-")
    );
}

//! Subcommands and their arguments.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use droidscope_axum::{CorsConfig, ServerConfig};
use droidscope_core::ToolConfig;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Check that the external tools can be run
    CheckTools(ToolArgs),
}

/// Arguments of `droidscope serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "DROIDSCOPE_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "DROIDSCOPE_PORT", default_value_t = droidscope_axum::DEFAULT_PORT)]
    pub port: u16,

    /// Allowed CORS origin; repeat or comma-separate. All origins when unset.
    #[arg(long = "allow-origin", env = "DROIDSCOPE_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

impl ServeArgs {
    pub fn into_config(self) -> ServerConfig {
        let cors = if self.allowed_origins.is_empty() {
            CorsConfig::AllowAll
        } else {
            CorsConfig::AllowOrigins(self.allowed_origins)
        };
        ServerConfig {
            host: self.host,
            port: self.port,
            cors,
            tools: self.tools.into_config(),
        }
    }
}

/// External tool locations and session timing.
#[derive(Debug, Clone, Args)]
pub struct ToolArgs {
    /// adb executable
    #[arg(long, env = "DROIDSCOPE_ADB", default_value = "adb")]
    pub adb: String,

    /// frida executable
    #[arg(long, env = "DROIDSCOPE_FRIDA", default_value = "frida")]
    pub frida: String,

    /// frida-trace executable
    #[arg(long, env = "DROIDSCOPE_FRIDA_TRACE", default_value = "frida-trace")]
    pub frida_trace: String,

    /// frida-ps executable
    #[arg(long, env = "DROIDSCOPE_FRIDA_PS", default_value = "frida-ps")]
    pub frida_ps: String,

    /// Shell used by the command route
    #[arg(long, env = "DROIDSCOPE_SHELL", default_value = "sh")]
    pub shell: String,

    /// Script loaded for method enumeration
    #[arg(
        long,
        env = "DROIDSCOPE_ENUM_SCRIPT",
        default_value = droidscope_core::config::DEFAULT_ENUMERATION_SCRIPT
    )]
    pub enum_script: PathBuf,

    /// Milliseconds before an enumeration is stopped
    #[arg(long, env = "DROIDSCOPE_ENUM_TIMEOUT_MS", default_value_t = 3000)]
    pub enum_timeout_ms: u64,

    /// Milliseconds between SIGTERM and SIGKILL
    #[arg(long, env = "DROIDSCOPE_KILL_GRACE_MS", default_value_t = 2000)]
    pub kill_grace_ms: u64,

    /// Milliseconds to wait after launching a trace target
    #[arg(long, env = "DROIDSCOPE_LAUNCH_SETTLE_MS", default_value_t = 0)]
    pub launch_settle_ms: u64,

    /// Allow only one trace per device and target
    #[arg(long, env = "DROIDSCOPE_EXCLUSIVE_TRACES")]
    pub exclusive_traces: bool,
}

impl ToolArgs {
    pub fn into_config(self) -> ToolConfig {
        ToolConfig::default()
            .with_adb(self.adb)
            .with_frida(self.frida)
            .with_frida_trace(self.frida_trace)
            .with_frida_ps(self.frida_ps)
            .with_shell(self.shell)
            .with_enumeration_script(self.enum_script)
            .with_enumeration_timeout(Duration::from_millis(self.enum_timeout_ms))
            .with_kill_grace(Duration::from_millis(self.kill_grace_ms))
            .with_launch_settle(Duration::from_millis(self.launch_settle_ms))
            .with_exclusive_traces(self.exclusive_traces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    fn serve(args: &[&str]) -> ServeArgs {
        let cli = Cli::parse_from(std::iter::once("droidscope").chain(args.iter().copied()));
        match cli.command {
            Some(Commands::Serve(args)) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_defaults_match_tool_defaults() {
        let config = serve(&["serve"]).into_config();
        assert_eq!(config.port, 8080);
        assert!(matches!(config.cors, CorsConfig::AllowAll));
        assert_eq!(config.tools, ToolConfig::default());
    }

    #[test]
    fn serve_overrides() {
        let config = serve(&[
            "serve",
            "--port",
            "9000",
            "--allow-origin",
            "http://localhost:3000,http://127.0.0.1:3000",
            "--frida-trace",
            "/opt/frida/bin/frida-trace",
            "--enum-timeout-ms",
            "5000",
            "--exclusive-traces",
        ])
        .into_config();
        assert_eq!(config.port, 9000);
        match config.cors {
            CorsConfig::AllowOrigins(origins) => assert_eq!(origins.len(), 2),
            CorsConfig::AllowAll => panic!("expected origin list"),
        }
        assert_eq!(config.tools.frida_trace, "/opt/frida/bin/frida-trace");
        assert_eq!(config.tools.enumeration_timeout, Duration::from_secs(5));
        assert!(config.tools.exclusive_traces);
    }
}

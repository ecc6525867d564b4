//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Drive Android app tracing, method enumeration and device logs over HTTP.
#[derive(Debug, Parser)]
#[command(name = "droidscope")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

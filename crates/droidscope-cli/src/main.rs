//! CLI entry point.

use clap::{CommandFactory, Parser};

use droidscope_cli::{Cli, Commands, handlers, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Commands::Serve(args)) => handlers::serve::execute(args).await,
        Some(Commands::CheckTools(tools)) => handlers::check_tools::execute(&tools.into_config()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

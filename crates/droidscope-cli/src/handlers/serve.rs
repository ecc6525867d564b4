//! `droidscope serve`.

use anyhow::Result;
use tracing::info;

use crate::commands::ServeArgs;

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = args.into_config();
    info!(address = %config.socket_addr(), "starting droidscope");
    droidscope_axum::start_server(config).await
}

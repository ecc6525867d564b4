//! Ad-hoc command execution.
//!
//! The command line runs through the configured shell with the server's
//! privileges. Only expose this route to trusted callers.

use axum::extract::{Query, State};
use axum::response::Response;

use crate::dto::CommandQuery;
use crate::error::HttpError;
use crate::sse::stream_session;
use crate::state::AppState;

/// Run a shell command and stream its output.
pub async fn execute(
    State(state): State<AppState>,
    Query(query): Query<CommandQuery>,
) -> Result<Response, HttpError> {
    let command = query.command()?;
    tracing::info!(%command, "executing command");
    let session = state.manager.run_command(&command)?;
    Ok(stream_session(session))
}

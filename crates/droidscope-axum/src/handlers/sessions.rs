//! Session registry handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use droidscope_core::{SessionId, SessionSummary};

use crate::error::HttpError;
use crate::state::AppState;

/// List active sessions.
pub async fn list(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.manager.sessions())
}

/// Get one active session.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, HttpError> {
    let id = parse_id(&id)?;
    state
        .manager
        .session(id)
        .map(Json)
        .ok_or_else(|| HttpError::not_found(format!("session {id} is not active")))
}

/// Cancel an active session.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let id = parse_id(&id)?;
    if state.manager.cancel(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::not_found(format!("session {id} is not active")))
    }
}

fn parse_id(raw: &str) -> Result<SessionId, HttpError> {
    raw.parse().map_err(|e| HttpError::BadRequest {
        message: format!("invalid session id '{raw}': {e}"),
        kind: "INVALID_PARAMETER",
    })
}

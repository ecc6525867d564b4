//! ADB handlers: device list and log streaming.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Response;
use droidscope_core::Device;

use crate::dto::LogcatQuery;
use crate::error::HttpError;
use crate::sse::stream_session;
use crate::state::AppState;

/// List connected devices.
pub async fn devices(State(state): State<AppState>) -> Result<Json<Vec<Device>>, HttpError> {
    Ok(Json(state.manager.devices().await?))
}

/// Stream the device log.
pub async fn logcat(
    State(state): State<AppState>,
    Query(query): Query<LogcatQuery>,
) -> Result<Response, HttpError> {
    let (device_id, filter) = query.into_parts()?;
    let session = state.manager.stream_logs(Some(&device_id), &filter)?;
    Ok(stream_session(session))
}

//! Frida handlers: tracing, method enumeration and the application list.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Response;
use droidscope_core::{InstalledApp, TraceRequest};
use serde_json::Value;

use crate::dto::{DeviceQuery, MethodsQuery, TraceQuery};
use crate::error::HttpError;
use crate::sse::stream_session;
use crate::state::AppState;

/// Start a trace and stream its output.
///
/// The target is launched first when it is installed but not running. Any
/// failure up to the tracer spawn is a JSON error response.
pub async fn trace(
    State(state): State<AppState>,
    Query(query): Query<TraceQuery>,
) -> Result<Response, HttpError> {
    let request = TraceRequest::try_from(query)?;
    let session = state.manager.start_trace(request).await?;
    Ok(stream_session(session))
}

/// Enumerate the target's classes.
pub async fn methods(
    State(state): State<AppState>,
    Query(query): Query<MethodsQuery>,
) -> Result<Json<Vec<Value>>, HttpError> {
    let process = query.process()?;
    let payload = state.manager.enumerate(&process).await?;
    Ok(Json(payload))
}

/// List installed applications.
pub async fn processes(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Result<Json<Vec<InstalledApp>>, HttpError> {
    let device_id = query.device_id();
    let apps = state
        .manager
        .installed_applications(device_id.as_deref())
        .await?;
    Ok(Json(apps))
}

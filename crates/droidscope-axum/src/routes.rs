//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Session registry routes, nested under `/api`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(handlers::sessions::list))
        .route(
            "/sessions/{id}",
            get(handlers::sessions::get).delete(handlers::sessions::cancel),
        )
}

/// Create the main Axum router.
///
/// Device routes sit at the root, where the web frontend expects them;
/// registry routes live under `/api`.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/health", get(health_check))
        // Frida
        .route("/frida/trace", get(handlers::frida::trace))
        .route("/frida/methods", get(handlers::frida::methods))
        .route("/frida/processes", get(handlers::frida::processes))
        // ADB
        .route("/adb/devices", get(handlers::adb::devices))
        .route("/adb/logcat", get(handlers::adb::logcat))
        // Terminal
        .route("/execute-in-terminal", get(handlers::terminal::execute))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}

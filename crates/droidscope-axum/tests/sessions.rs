//! A live stream shows up in the registry and can be cancelled over HTTP.

#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use common::{app, body_json, body_string, get, send};
use droidscope_core::ToolConfig;

#[tokio::test]
async fn cancelling_a_stream_terminates_it() {
    let router = app(Arc::default(), ToolConfig::default());

    let response = get(router.clone(), "/execute-in-terminal?command=sleep%2030").await;
    assert_eq!(response.status(), StatusCode::OK);

    let sessions = body_json(get(router.clone(), "/api/sessions").await).await;
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["kind"], "genericStream");
    assert_eq!(sessions[0]["state"], "streaming");
    let id = sessions[0]["id"].as_str().unwrap().to_string();

    let cancelled = send(router.clone(), Method::DELETE, &format!("/api/sessions/{id}")).await;
    assert_eq!(cancelled.status(), StatusCode::NO_CONTENT);

    let body = tokio::time::timeout(Duration::from_secs(10), body_string(response))
        .await
        .expect("stream did not end after cancel");
    assert_eq!(body, "data: Process terminated\n\n");

    let sessions = body_string(get(router, "/api/sessions").await).await;
    assert_eq!(sessions, "[]");
}

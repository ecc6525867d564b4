//! Axum-specific error types and mappings.
//!
//! Maps [`SessionError`] and [`BridgeError`] to HTTP status codes and JSON
//! bodies. Only failures that happen before a stream opens reach this type;
//! once an SSE response has started, everything is reported in-band.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use droidscope_core::{BridgeError, SessionError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (missing or invalid parameter).
    #[error("Bad request: {message}")]
    BadRequest { message: String, kind: &'static str },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound { message: String, kind: &'static str },

    /// Conflicts with an active session.
    #[error("Conflict: {message}")]
    Conflict { message: String, kind: &'static str },

    /// A device tool failed.
    #[error("Bad gateway: {message}")]
    BadGateway { message: String, kind: &'static str },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal { message: String, kind: &'static str },
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            kind: "NOT_FOUND",
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(rename = "type")]
    error_type: &'static str,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, error_type) = match self {
            Self::BadRequest { message, kind }
            | Self::NotFound { message, kind }
            | Self::Conflict { message, kind }
            | Self::BadGateway { message, kind }
            | Self::Internal { message, kind } => (message, kind),
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error_type, "{}", message);
        }

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            error_type,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            SessionError::MissingParameter(_) | SessionError::InvalidParameter { .. } => {
                Self::BadRequest { message, kind }
            }
            SessionError::TargetNotInstalled { .. } => Self::NotFound { message, kind },
            SessionError::AlreadyActive { .. } => Self::Conflict { message, kind },
            SessionError::LaunchFailed { .. } | SessionError::Bridge(_) => {
                Self::BadGateway { message, kind }
            }
            SessionError::Spawn { .. }
            | SessionError::MalformedOutput
            | SessionError::ParseFailure(_)
            | SessionError::Cancelled
            | SessionError::InvalidTransition { .. } => Self::Internal { message, kind },
        }
    }
}

impl From<BridgeError> for HttpError {
    fn from(err: BridgeError) -> Self {
        SessionError::Bridge(err).into()
    }
}

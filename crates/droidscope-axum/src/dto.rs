//! Query parameters accepted by the HTTP routes.
//!
//! Every field is optional at the extractor level so that a missing
//! parameter is reported through [`crate::HttpError`] with the usual JSON
//! body instead of axum's plain-text rejection.

use droidscope_core::{LogLevel, LogcatFilter, SessionError, TraceRequest};
use serde::Deserialize;

/// Treat an empty query value like an absent one.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `GET /frida/trace`
#[derive(Debug, Default, Deserialize)]
pub struct TraceQuery {
    pub process: Option<String>,
    pub filter: Option<String>,
    pub id: Option<String>,
}

impl TryFrom<TraceQuery> for TraceRequest {
    type Error = SessionError;

    fn try_from(query: TraceQuery) -> Result<Self, Self::Error> {
        let process = present(query.process).ok_or(SessionError::MissingParameter("process"))?;
        let mut request = Self::new(process);
        if let Some(filter) = present(query.filter) {
            request = request.with_filter(filter);
        }
        if let Some(id) = present(query.id) {
            request = request.with_device(id);
        }
        Ok(request)
    }
}

/// `GET /frida/methods`
#[derive(Debug, Default, Deserialize)]
pub struct MethodsQuery {
    pub process: Option<String>,
}

impl MethodsQuery {
    pub fn process(self) -> Result<String, SessionError> {
        present(self.process).ok_or(SessionError::MissingParameter("process"))
    }
}

/// `GET /adb/logcat`
#[derive(Debug, Default, Deserialize)]
pub struct LogcatQuery {
    pub id: Option<String>,
    pub filter: Option<String>,
    pub level: Option<String>,
}

impl LogcatQuery {
    /// Device id and filter; the level defaults to info.
    pub fn into_parts(self) -> Result<(String, LogcatFilter), SessionError> {
        let id = present(self.id).ok_or(SessionError::MissingParameter("id"))?;
        let level = present(self.level)
            .map(|level| level.parse::<LogLevel>())
            .transpose()?
            .unwrap_or_default();
        let filter = LogcatFilter {
            tag: present(self.filter),
            level,
        };
        Ok((id, filter))
    }
}

/// `GET /execute-in-terminal`
#[derive(Debug, Default, Deserialize)]
pub struct CommandQuery {
    pub command: Option<String>,
}

impl CommandQuery {
    pub fn command(self) -> Result<String, SessionError> {
        present(self.command).ok_or(SessionError::MissingParameter("command"))
    }
}

/// Optional device selector for one-shot queries.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceQuery {
    pub id: Option<String>,
}

impl DeviceQuery {
    pub fn device_id(self) -> Option<String> {
        present(self.id)
    }
}

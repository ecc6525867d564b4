//! Events delivered to a stream subscriber.
//!
//! Every event renders to exactly one line of text. Transports decide how to
//! frame that text; the SSE adapter wraps it as `data: <text>\n\n`.

use serde::{Deserialize, Serialize};

use super::line::Line;

/// Verb used when announcing an exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitVerb {
    /// `<label> closed with code <n>`, used for tool streams.
    #[default]
    Closed,
    /// `<label> exited with code <n>`, used for ad-hoc commands.
    Exited,
}

impl ExitVerb {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Exited => "exited",
        }
    }
}

/// How a streamed process finished.
///
/// A non-zero code is reported as data, never as a failure: tools such as
/// `frida-trace` exit non-zero when the user stops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReport {
    /// Human-readable name of the process, e.g. `frida-trace` or `Logcat`.
    pub label: String,
    /// Exit code, or `None` when the process was ended by a signal.
    pub code: Option<i32>,
    #[serde(default)]
    pub verb: ExitVerb,
}

impl ExitReport {
    pub fn new(label: impl Into<String>, code: Option<i32>) -> Self {
        Self {
            label: label.into(),
            code,
            verb: ExitVerb::Closed,
        }
    }

    #[must_use]
    pub const fn with_verb(mut self, verb: ExitVerb) -> Self {
        self.verb = verb;
        self
    }

    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// One unit of output for the remote subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// A line from the process' stdout or stderr.
    Line(Line),
    /// The process exited; always the last event of a stream that closed.
    Exit(ExitReport),
    /// The stream was ended by the server before the process exited.
    Terminated { label: String },
}

impl StreamEvent {
    /// Render the event as the single line of text a subscriber sees.
    pub fn render(&self) -> String {
        match self {
            Self::Line(line) if line.is_error() => format!("ERROR: {}", line.text),
            Self::Line(line) => line.text.clone(),
            Self::Exit(ExitReport {
                label,
                code: Some(code),
                verb,
            }) => format!("{label} {} with code {code}", verb.as_str()),
            Self::Exit(ExitReport {
                label, code: None, ..
            }) => format!("{label} terminated by signal"),
            Self::Terminated { label } => format!("{label} terminated"),
        }
    }

    /// Whether this event ends the stream.
    pub const fn is_final(&self) -> bool {
        !matches!(self, Self::Line(_))
    }
}

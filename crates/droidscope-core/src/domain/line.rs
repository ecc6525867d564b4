//! A single line of process output.

use serde::{Deserialize, Serialize};

/// Which pipe a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Stdout,
    Stderr,
}

impl Origin {
    /// Stream name used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// One complete line of output, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub origin: Origin,
    pub text: String,
}

impl Line {
    pub fn new(origin: Origin, text: impl Into<String>) -> Self {
        Self {
            origin,
            text: text.into(),
        }
    }

    pub fn stdout(text: impl Into<String>) -> Self {
        Self::new(Origin::Stdout, text)
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self::new(Origin::Stderr, text)
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.origin, Origin::Stderr)
    }
}

//! Error record models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An error reported to the UI error screen.
///
/// This is data, not an exception: placing one in a hook response annotates
/// the record while processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Code displayed in the error screen.
    pub code: String,
    /// Message describing the error.
    pub message: String,
    /// Source of the error.
    #[serde(default)]
    pub source: String,
}

impl ErrorRecord {
    /// Create an error record.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {} ({})", self.code, self.message, self.source)
        }
    }
}

/// An error returned by the destination application for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    /// Code describing the error.
    pub code: String,
    /// Message describing the error.
    pub message: String,
}

impl ImportError {
    /// Create an import error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<ImportError> for ErrorRecord {
    fn from(err: ImportError) -> Self {
        Self {
            code: err.code,
            message: err.message,
            source: "application".to_string(),
        }
    }
}

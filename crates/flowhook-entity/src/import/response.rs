//! Import response model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImportError;

/// Result of submitting one record to a destination application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse<T = Value> {
    /// The status code from the import application.
    pub status_code: u16,
    /// Errors that happened during the import.
    #[serde(default)]
    pub errors: Vec<ImportError>,
    /// Whether the record was skipped/filtered.
    #[serde(default)]
    pub ignored: bool,
    /// The id from the import application response.
    #[serde(default)]
    pub id: String,
    /// The complete response data from the import application.
    #[serde(rename = "_json")]
    pub json: T,
    /// A URI for the data in the import application.
    #[serde(rename = "dataURI", default, skip_serializing_if = "Option::is_none")]
    pub data_uri: Option<String>,
}

impl<T> ImportResponse<T> {
    /// A successful response carrying the destination payload.
    pub fn ok(status_code: u16, id: impl Into<String>, json: T) -> Self {
        Self {
            status_code,
            errors: Vec::new(),
            ignored: false,
            id: id.into(),
            json,
            data_uri: None,
        }
    }

    /// Whether the destination accepted the record.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code) && self.errors.is_empty() && !self.ignored
    }

    /// Attach another error to this response.
    pub fn push_error(&mut self, error: ImportError) {
        self.errors.push(error);
    }

    /// Replace the payload, keeping the envelope.
    pub fn map_json<U>(self, f: impl FnOnce(T) -> U) -> ImportResponse<U> {
        ImportResponse {
            status_code: self.status_code,
            errors: self.errors,
            ignored: self.ignored,
            id: self.id,
            json: f(self.json),
            data_uri: self.data_uri,
        }
    }
}

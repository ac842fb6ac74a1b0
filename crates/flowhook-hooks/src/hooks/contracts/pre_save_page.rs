//! preSavePage: invoked on a page of exported records before the page is
//! sent to subsequent steps. May add, update or delete records. Throwing
//! stops the entire flow.

use std::collections::{HashMap, HashSet};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use flowhook_core::error::AppError;
use flowhook_entity::{DeltaMembers, DeltaWindow, ErrorRecord, ExportOptions, File};

use crate::hooks::violation::ContractViolation;

/// An error on an exported page, linked to its retry data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageError {
    /// The error itself.
    #[serde(flatten)]
    pub error: ErrorRecord,
    /// Key of the entry in `retryData` this error belongs to.
    #[serde(rename = "retryDataKey", default)]
    pub retry_data_key: String,
}

/// Data needed to retry a failed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryData<T = Value> {
    /// The record to retry.
    pub data: T,
    /// The flow stage the record failed in.
    pub stage: String,
    /// Trace key identifying the record across runs.
    pub trace_key: String,
}

/// Which kind of export produced the page.
///
/// Discriminated on the wire by member presence: `files` marks a
/// file-backed export, the two export timestamps mark a delta export.
/// A present member must be well formed; it never falls back to
/// [`PageVariant::Standard`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageVariant {
    /// File-backed export; `files[i]` belongs to `data[i]`.
    File {
        /// One entry per record.
        files: Vec<File>,
    },
    /// Delta export bounded by the previous and current run.
    Delta(DeltaWindow),
    /// Plain export.
    Standard {},
}

/// The presence-bearing members of a page, before the variant is chosen.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantMembers {
    #[serde(default)]
    files: Option<Value>,
    #[serde(default)]
    last_export_date_time: Option<Value>,
    #[serde(default)]
    current_export_date_time: Option<Value>,
}

impl<'de> Deserialize<'de> for PageVariant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let members = VariantMembers::deserialize(deserializer)?;
        let delta = DeltaMembers {
            last_export_date_time: members.last_export_date_time,
            current_export_date_time: members.current_export_date_time,
        };

        match members.files {
            Some(_) if !delta.is_absent() => Err(D::Error::custom(
                "page carries both files and delta export members",
            )),
            Some(files) => serde_json::from_value(files)
                .map(|files| Self::File { files })
                .map_err(|e| D::Error::custom(format!("files is not a list of files: {e}"))),
            None => match delta.into_window().map_err(|e| D::Error::custom(e.message))? {
                Some(window) => Ok(Self::Delta(window)),
                None => Ok(Self::Standard {}),
            },
        }
    }
}

impl Default for PageVariant {
    fn default() -> Self {
        Self::Standard {}
    }
}

/// Input of preSavePage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreSavePageOptions<T = Value> {
    /// Export context.
    #[serde(flatten)]
    pub export: ExportOptions,
    /// One page of data.
    pub data: Vec<T>,
    /// Errors accumulated for this page.
    #[serde(default)]
    pub errors: Vec<PageError>,
    /// Retry data for all errors, keyed by `retryDataKey`.
    #[serde(rename = "retryData", default)]
    pub retry_data: HashMap<String, RetryData<T>>,
    /// Zero-based page of the batch export currently running.
    #[serde(rename = "pageIndex")]
    pub page_index: u32,
    /// Standard, file or delta export members.
    #[serde(flatten)]
    pub variant: PageVariant,
}

/// A new error together with the data needed to retry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewErrorsAndRetryData<T = Value> {
    /// The record to retry.
    #[serde(rename = "retryData")]
    pub retry_data: T,
    /// Errors raised for it.
    pub errors: Vec<PageError>,
}

/// Output of preSavePage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreSavePageResponse<T = Value> {
    /// The modified data.
    pub data: Vec<T>,
    /// The modified errors. Must not contain errors absent from the input.
    #[serde(default)]
    pub errors: Vec<PageError>,
    /// Stop the batch export from generating further pages.
    #[serde(default)]
    pub abort: bool,
    /// New errors linked to retry data.
    #[serde(rename = "newErrorsAndRetryData", default)]
    pub new_errors_and_retry_data: Vec<NewErrorsAndRetryData<T>>,
}

impl<T: Clone> PreSavePageResponse<T> {
    /// The response an absent hook implies: everything passes unchanged.
    pub fn pass_through(options: &PreSavePageOptions<T>) -> Self {
        Self {
            data: options.data.clone(),
            errors: options.errors.clone(),
            abort: false,
            new_errors_and_retry_data: Vec::new(),
        }
    }
}

impl<T> PreSavePageOptions<T> {
    /// Check the input before it is handed to the script.
    pub fn validate(&self) -> Result<(), AppError> {
        match &self.variant {
            PageVariant::File { files } if files.len() != self.data.len() => {
                Err(AppError::validation(
                    ContractViolation::FileCountMismatch {
                        files: files.len(),
                        records: self.data.len(),
                    }
                    .to_string(),
                ))
            }
            PageVariant::Delta(window) => window.validate(),
            _ => Ok(()),
        }
    }

    /// The delta window, for delta exports.
    pub fn delta(&self) -> Option<&DeltaWindow> {
        match &self.variant {
            PageVariant::Delta(window) => Some(window),
            _ => None,
        }
    }

    /// The attached files, for file-backed exports.
    pub fn files(&self) -> Option<&[File]> {
        match &self.variant {
            PageVariant::File { files } => Some(files),
            _ => None,
        }
    }
}

/// Check the reply: returned errors may only modify errors present in the
/// input; new ones belong in `newErrorsAndRetryData`.
pub fn validate_response<T, K>(
    options: &PreSavePageOptions<T>,
    response: &PreSavePageResponse<K>,
) -> Result<(), ContractViolation> {
    let known: HashSet<&str> = options
        .errors
        .iter()
        .map(|e| e.retry_data_key.as_str())
        .collect();

    match response
        .errors
        .iter()
        .find(|e| !known.contains(e.retry_data_key.as_str()))
    {
        Some(injected) => Err(ContractViolation::InjectedError {
            retry_data_key: injected.retry_data_key.clone(),
        }),
        None => Ok(()),
    }
}

//! filter: invoked per record before or after an import/export runs.
//! Returning `true` keeps the record. Throwing returns an error for that
//! record only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_entity::{DeltaWindow, Job, Settings};

/// Input of filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions<T = Value> {
    /// The record being filtered; an object or an array depending on the source.
    pub record: T,
    /// Zero-based page of the batch export this record belongs to.
    pub page_index: u32,
    /// All custom settings in scope.
    #[serde(default)]
    pub settings: Settings,
    /// Test mode and preview flag.
    #[serde(default)]
    pub test_mode: bool,
    /// The job currently running.
    pub job: Job,
    /// Export time bounds, for delta exports only.
    #[serde(
        flatten,
        deserialize_with = "flowhook_entity::options::delta::deserialize_optional"
    )]
    pub delta: Option<DeltaWindow>,
}

/// Page-level context shared by every filter call on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterScope {
    /// Zero-based page index.
    pub page_index: u32,
    /// Settings in scope.
    pub settings: Settings,
    /// Test mode flag.
    pub test_mode: bool,
    /// Running job.
    pub job: Job,
    /// Delta window, if any.
    pub delta: Option<DeltaWindow>,
}

impl FilterScope {
    /// Build the options for one record of the page.
    pub fn options_for<T>(&self, record: T) -> FilterOptions<T> {
        FilterOptions {
            record,
            page_index: self.page_index,
            settings: self.settings.clone(),
            test_mode: self.test_mode,
            job: self.job.clone(),
            delta: self.delta,
        }
    }
}

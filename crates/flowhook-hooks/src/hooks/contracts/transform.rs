//! transform: invoked per exported record; returns the record in any shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_entity::{Job, Settings};

/// Input of transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOptions<T = Value> {
    /// The record to transform.
    pub record: T,
    /// All custom settings in scope.
    #[serde(default)]
    pub settings: Settings,
    /// Test mode and preview flag.
    #[serde(default)]
    pub test_mode: bool,
    /// The job currently running.
    pub job: Job,
}

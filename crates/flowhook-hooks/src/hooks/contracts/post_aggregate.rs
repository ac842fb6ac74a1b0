//! postAggregate: invoked once after the final aggregated file is uploaded
//! to the destination. Never invoked when aggregation is skipped. Throwing
//! is fatal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_entity::{ErrorRecord, ImportOptions};

/// Information about an aggregated upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation<T = Value> {
    /// Whether the aggregation was successful.
    pub success: bool,
    /// Information about the aggregated data transfer.
    #[serde(rename = "_json")]
    pub json: T,
    /// Error code for a failed aggregate.
    #[serde(default)]
    pub code: String,
    /// Error message for a failed aggregate.
    #[serde(default)]
    pub message: String,
    /// Error source for a failed aggregate.
    #[serde(default)]
    pub source: String,
}

impl<T> Aggregation<T> {
    /// The failure as an error record, when the aggregation failed.
    pub fn error(&self) -> Option<ErrorRecord> {
        (!self.success).then(|| {
            ErrorRecord::new(self.code.clone(), self.message.clone(), self.source.clone())
        })
    }
}

/// Input of postAggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAggregateOptions<T = Value> {
    /// Import context.
    #[serde(flatten)]
    pub import: ImportOptions,
    /// The aggregate.
    #[serde(rename = "postAggregateData")]
    pub post_aggregate_data: Aggregation<T>,
}

/// What happened at the postAggregate extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateDelivery {
    /// The hook ran and returned.
    Invoked,
    /// Aggregation is skipped, so the hook was not invoked.
    Skipped,
    /// No handler is bound.
    NoHandler,
}

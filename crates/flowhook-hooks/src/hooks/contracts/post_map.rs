//! postMap: invoked on a page of records after mapping, before submission
//! to the destination. Throwing fails the entire page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_core::error::AppError;
use flowhook_entity::ImportOptions;

use crate::hooks::definitions::HookPoint;
use crate::hooks::outcome::RecordResponse;
use crate::hooks::violation::ContractViolation;

/// Input of postMap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMapOptions<T = Value, K = Value> {
    /// Import context.
    #[serde(flatten)]
    pub import: ImportOptions,
    /// The page before it was mapped.
    pub pre_map_data: Vec<T>,
    /// The page after it was mapped.
    pub post_map_data: Vec<K>,
}

/// Output of postMap: one entry per mapped record, in input order.
pub type PostMapResponse<T = Value> = Vec<RecordResponse<T>>;

impl<T, K> PostMapOptions<T, K> {
    /// Both views of the page must describe the same records.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.pre_map_data.len() != self.post_map_data.len() {
            return Err(AppError::validation(format!(
                "preMapData has {} records but postMapData has {}",
                self.pre_map_data.len(),
                self.post_map_data.len()
            )));
        }
        Ok(())
    }
}

/// Check `response.len() == options.post_map_data.len()`.
pub fn validate_response<T, K, R>(
    options: &PostMapOptions<T, K>,
    response: &[RecordResponse<R>],
) -> Result<(), ContractViolation> {
    ContractViolation::check_length(HookPoint::PostMap, options.post_map_data.len(), response.len())
}

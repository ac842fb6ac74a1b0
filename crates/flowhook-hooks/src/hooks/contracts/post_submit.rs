//! postSubmit: invoked on a page after it was submitted to the destination.
//! The hook returns the `responseData` array with entries modified in
//! place; its length must not change. Throwing fails the entire page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_core::error::AppError;
use flowhook_entity::{ImportOptions, ImportResponse};

use crate::hooks::definitions::HookPoint;
use crate::hooks::violation::ContractViolation;

/// Input of postSubmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSubmitOptions<T = Value, R = Value, K = Value> {
    /// Import context.
    #[serde(flatten)]
    pub import: ImportOptions,
    /// The page before it was mapped.
    pub pre_map_data: Vec<T>,
    /// The page after it was mapped.
    pub post_map_data: Vec<R>,
    /// One destination response per submitted record.
    pub response_data: Vec<ImportResponse<K>>,
}

/// Output of postSubmit: the response data array, same length as the input.
pub type PostSubmitResponse<S = Value> = Vec<ImportResponse<S>>;

impl<T, R, K> PostSubmitOptions<T, R, K> {
    /// All three arrays must describe the same records.
    pub fn validate(&self) -> Result<(), AppError> {
        let records = self.post_map_data.len();
        if self.pre_map_data.len() != records || self.response_data.len() != records {
            return Err(AppError::validation(format!(
                "postSubmit arrays disagree: preMapData {}, postMapData {}, responseData {}",
                self.pre_map_data.len(),
                records,
                self.response_data.len()
            )));
        }
        Ok(())
    }
}

/// Check `response.len() == options.response_data.len()`.
pub fn validate_response<T, R, K, S>(
    options: &PostSubmitOptions<T, R, K>,
    response: &[ImportResponse<S>],
) -> Result<(), ContractViolation> {
    ContractViolation::check_length(
        HookPoint::PostSubmit,
        options.response_data.len(),
        response.len(),
    )
}

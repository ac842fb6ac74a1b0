//! preMap: invoked on a page of records before they are mapped from source
//! to destination structures. Changes stay local to the import. Throwing
//! fails the entire page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_entity::ImportOptions;

use crate::hooks::definitions::HookPoint;
use crate::hooks::outcome::RecordResponse;
use crate::hooks::violation::ContractViolation;

/// Input of preMap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreMapOptions<T = Value> {
    /// Import context.
    #[serde(flatten)]
    pub import: ImportOptions,
    /// The page of data before it has been mapped.
    pub data: Vec<T>,
}

/// Output of preMap: one entry per input record, in input order.
pub type PreMapResponse<T = Value> = Vec<RecordResponse<T>>;

/// Check `response.len() == options.data.len()`.
pub fn validate_response<T, K>(
    options: &PreMapOptions<T>,
    response: &[RecordResponse<K>],
) -> Result<(), ContractViolation> {
    ContractViolation::check_length(HookPoint::PreMap, options.data.len(), response.len())
}

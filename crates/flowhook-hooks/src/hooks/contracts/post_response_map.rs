//! postResponseMap: invoked on a page after response/results mapping.
//! Elements may change freely but the array length may not. Throwing is
//! fatal and fails the entire page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_core::types::{ExportId, ImportId};
use flowhook_entity::{ImportResponse, Options};

use crate::hooks::definitions::HookPoint;
use crate::hooks::violation::ContractViolation;

/// Input of postResponseMap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponseMapOptions<T = Value, K = Value> {
    /// Shared context.
    #[serde(flatten)]
    pub options: Options,
    /// The id of the currently running export.
    #[serde(rename = "_exportId")]
    pub export_id: ExportId,
    /// The id of the currently running import.
    #[serde(rename = "_importId")]
    pub import_id: ImportId,
    /// The page after response mapping is complete.
    pub post_response_map_data: Vec<T>,
    /// The destination response the mapping was applied from.
    pub response_data: ImportResponse<K>,
    /// As configured on the export/import resource.
    #[serde(default)]
    pub one_to_many: bool,
    /// As configured on the export/import resource.
    #[serde(default)]
    pub path_to_many: String,
}

/// Output of postResponseMap: same length as `postResponseMapData`.
pub type PostResponseMapResponse<T = Value> = Vec<T>;

/// Check `response.len() == options.post_response_map_data.len()`.
pub fn validate_response<T, K, R>(
    options: &PostResponseMapOptions<T, K>,
    response: &[R],
) -> Result<(), ContractViolation> {
    ContractViolation::check_length(
        HookPoint::PostResponseMap,
        options.post_response_map_data.len(),
        response.len(),
    )
}

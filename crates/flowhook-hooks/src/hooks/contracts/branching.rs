//! branching: invoked per record; returns the indices of the branches the
//! record is routed to.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use flowhook_entity::Settings;

use crate::hooks::violation::ContractViolation;

/// Input of branching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchingOptions<T = Value> {
    /// The record to route.
    pub record: T,
    /// All custom settings in scope.
    #[serde(default)]
    pub settings: Settings,
    /// Test mode and preview flag.
    #[serde(default)]
    pub test_mode: bool,
}

/// Check every index against the configured branch count and collapse
/// duplicates, keeping first occurrences in order.
pub fn normalize_branches(
    indices: Vec<usize>,
    branch_count: usize,
) -> Result<Vec<usize>, ContractViolation> {
    let mut seen = HashSet::new();
    let mut routed = Vec::with_capacity(indices.len());

    for index in indices {
        if index >= branch_count {
            return Err(ContractViolation::BranchOutOfRange {
                index,
                branch_count,
            });
        }
        if seen.insert(index) {
            routed.push(index);
        }
    }

    Ok(routed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_in_order() {
        assert_eq!(normalize_branches(vec![2, 0, 2, 1], 3), Ok(vec![2, 0, 1]));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            normalize_branches(vec![0, 3], 3),
            Err(ContractViolation::BranchOutOfRange {
                index: 3,
                branch_count: 3
            })
        );
    }

    #[test]
    fn test_empty_routes_nowhere() {
        assert_eq!(normalize_branches(Vec::new(), 2), Ok(Vec::new()));
    }
}

//! Host-side reconciliation of per-record hook responses against the page
//! they were produced for.
//!
//! Slot `i` of a response only ever affects record `i` of the input. The
//! length check runs before any slot is interpreted.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use flowhook_entity::ErrorRecord;

use super::definitions::HookPoint;
use super::outcome::{HookFailure, RecordOutcome, RecordResponse};
use super::violation::ContractViolation;

/// A record that proceeds downstream, tagged with its input position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeptRecord<T = Value> {
    /// Position in the input page.
    pub index: usize,
    /// The record as returned by the hook.
    pub data: T,
}

/// An error reported for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordError {
    /// Position in the input page.
    pub index: usize,
    /// The error.
    pub error: ErrorRecord,
}

/// The effect of a per-record response on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReconciliation<T = Value> {
    /// Number of records in the input page.
    pub input_len: usize,
    /// Records that proceed, in input order.
    pub kept: Vec<KeptRecord<T>>,
    /// Errors to log, in input order.
    pub errors: Vec<RecordError>,
    /// Positions of records excluded from further processing.
    pub dropped: Vec<usize>,
}

impl<T> PageReconciliation<T> {
    /// Every record proceeds unchanged.
    pub fn pass_through(records: Vec<T>) -> Self {
        Self {
            input_len: records.len(),
            kept: records
                .into_iter()
                .enumerate()
                .map(|(index, data)| KeptRecord { index, data })
                .collect(),
            errors: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// The records that proceed, without their positions.
    pub fn into_records(self) -> Vec<T> {
        self.kept.into_iter().map(|k| k.data).collect()
    }

    /// Borrow the records that proceed.
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.kept.iter().map(|k| &k.data)
    }

    /// Whether any record reported an error.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A record whose per-record hook terminated abnormally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    /// Position in the input page.
    pub index: usize,
    /// What went wrong.
    pub failure: HookFailure,
}

/// Result of running filter over every record of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterReport<T = Value> {
    /// Records the filter kept, in input order.
    pub kept: Vec<KeptRecord<T>>,
    /// Positions of records the filter rejected.
    pub excluded: Vec<usize>,
    /// Records whose filter call failed; siblings are unaffected.
    pub failed: Vec<RecordFailure>,
}

/// Result of running transform over every record of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport<T = Value> {
    /// Transformed records, in input order.
    pub records: Vec<KeptRecord<T>>,
    /// Records whose transform call failed.
    pub failed: Vec<RecordFailure>,
}

/// Apply a per-record response array to a page of `input_len` records.
pub fn reconcile_records<T>(
    hook: HookPoint,
    input_len: usize,
    responses: Vec<RecordResponse<T>>,
) -> Result<PageReconciliation<T>, ContractViolation> {
    ContractViolation::check_length(hook, input_len, responses.len())?;

    let mut reconciliation = PageReconciliation {
        input_len,
        kept: Vec::with_capacity(input_len),
        errors: Vec::new(),
        dropped: Vec::new(),
    };

    for (index, response) in responses.into_iter().enumerate() {
        let errors = match RecordOutcome::from(response) {
            RecordOutcome::Keep(data) => {
                reconciliation.kept.push(KeptRecord { index, data });
                Vec::new()
            }
            RecordOutcome::KeepWithError(data, errors) => {
                reconciliation.kept.push(KeptRecord { index, data });
                errors
            }
            RecordOutcome::Drop => {
                reconciliation.dropped.push(index);
                Vec::new()
            }
            RecordOutcome::DropWithError(errors) => {
                reconciliation.dropped.push(index);
                errors
            }
        };

        for error in errors {
            warn!(
                hook = %hook,
                record = index,
                code = %error.code,
                message = %error.message,
                "Hook reported record error"
            );
            reconciliation.errors.push(RecordError { index, error });
        }
    }

    Ok(reconciliation)
}

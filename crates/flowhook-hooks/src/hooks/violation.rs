//! Contract violations detected in hook replies.

use thiserror::Error;

use super::definitions::HookPoint;

/// A hook reply that does not satisfy its contract.
///
/// The dispatcher treats a violation exactly like an abnormal termination
/// of the hook that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// A per-record array does not line up with its input.
    #[error("{hook} returned {actual} entries for a page of {expected} records")]
    LengthMismatch {
        /// The hook.
        hook: HookPoint,
        /// Input length.
        expected: usize,
        /// Response length.
        actual: usize,
    },
    /// The handler answered a different hook.
    #[error("expected a {expected} reply but received a {actual} reply")]
    UnexpectedReply {
        /// The hook invoked.
        expected: HookPoint,
        /// The hook the reply belongs to.
        actual: HookPoint,
    },
    /// preSavePage added errors instead of using `newErrorsAndRetryData`.
    #[error("preSavePage returned error with unknown retryDataKey '{retry_data_key}'")]
    InjectedError {
        /// The key not present in the input.
        retry_data_key: String,
    },
    /// File-backed page where files and records do not line up.
    #[error("{files} files supplied for {records} records")]
    FileCountMismatch {
        /// Number of files.
        files: usize,
        /// Number of records.
        records: usize,
    },
    /// branching routed to a branch that does not exist.
    #[error("branch index {index} is out of range for {branch_count} branches")]
    BranchOutOfRange {
        /// The offending index.
        index: usize,
        /// Branches configured.
        branch_count: usize,
    },
    /// handleRequest returned a status code outside 100..=599.
    #[error("invalid HTTP status code {0}")]
    InvalidStatusCode(u16),
    /// contentBasedFlowRouter left a required id empty.
    #[error("route is missing {0}")]
    MissingRoute(&'static str),
}

const CONTRACT_CODES: [&str; 7] = [
    "length_mismatch",
    "unexpected_reply",
    "injected_error",
    "file_count_mismatch",
    "branch_out_of_range",
    "invalid_status_code",
    "missing_route",
];

impl ContractViolation {
    /// Machine-readable code for this violation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LengthMismatch { .. } => CONTRACT_CODES[0],
            Self::UnexpectedReply { .. } => CONTRACT_CODES[1],
            Self::InjectedError { .. } => CONTRACT_CODES[2],
            Self::FileCountMismatch { .. } => CONTRACT_CODES[3],
            Self::BranchOutOfRange { .. } => CONTRACT_CODES[4],
            Self::InvalidStatusCode(_) => CONTRACT_CODES[5],
            Self::MissingRoute(_) => CONTRACT_CODES[6],
        }
    }

    /// Whether `code` names a contract violation.
    pub fn is_contract_code(code: &str) -> bool {
        CONTRACT_CODES.contains(&code)
    }

    /// Check a per-record response length against its input.
    pub fn check_length(hook: HookPoint, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LengthMismatch {
                hook,
                expected,
                actual,
            })
        }
    }
}

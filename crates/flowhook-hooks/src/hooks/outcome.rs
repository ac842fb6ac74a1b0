//! Per-record outcomes and per-invocation results.
//!
//! A hook reports problems through two separate channels:
//!
//! - a structured [`ErrorRecord`] placed in its response annotates one
//!   record and processing continues;
//! - a [`ScriptFailure`] (the hook body terminated abnormally) fails the
//!   unit of work given by the hook's [`FailureScope`].
//!
//! [`HookOutcome`] carries the second channel through the type system.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use flowhook_core::error::AppError;
use flowhook_entity::ErrorRecord;

use super::definitions::{FailureScope, HookPoint};
use super::violation::ContractViolation;

/// Wire form of one slot of a per-record response array: `{data?, errors?}`.
///
/// `errors` accepts a single error object or an array of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResponse<T = Value> {
    /// The record to pass along for processing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Errors to report for this record.
    #[serde(
        default,
        deserialize_with = "deserialize_errors",
        skip_serializing_if = "Option::is_none"
    )]
    pub errors: Option<Vec<ErrorRecord>>,
}

impl<T> Default for RecordResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            errors: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(ErrorRecord),
    Many(Vec<ErrorRecord>),
}

fn deserialize_errors<'de, D>(deserializer: D) -> Result<Option<Vec<ErrorRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed: Option<OneOrMany> = Option::deserialize(deserializer)?;
    Ok(parsed
        .map(|v| match v {
            OneOrMany::One(error) => vec![error],
            OneOrMany::Many(errors) => errors,
        })
        .filter(|errors| !errors.is_empty()))
}

impl<T> RecordResponse<T> {
    /// Keep the record as given.
    pub fn keep(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    /// Drop the record silently.
    pub fn drop_record() -> Self {
        Self::default()
    }

    /// Attach an error to this slot.
    pub fn with_error(mut self, error: ErrorRecord) -> Self {
        self.errors.get_or_insert_with(Vec::new).push(error);
        self
    }
}

/// What the host does with one record, derived from the presence of
/// `data` and `errors` in its response slot.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome<T = Value> {
    /// Only `data`: the record proceeds.
    Keep(T),
    /// Both: the record proceeds and the errors are logged.
    KeepWithError(T, Vec<ErrorRecord>),
    /// Neither: the record is filtered out silently.
    Drop,
    /// Only `errors`: the record is excluded and the errors are logged.
    DropWithError(Vec<ErrorRecord>),
}

impl<T> RecordOutcome<T> {
    /// The record that proceeds, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Keep(data) | Self::KeepWithError(data, _) => Some(data),
            Self::Drop | Self::DropWithError(_) => None,
        }
    }

    /// The errors reported for this record.
    pub fn errors(&self) -> &[ErrorRecord] {
        match self {
            Self::KeepWithError(_, errors) | Self::DropWithError(errors) => errors,
            Self::Keep(_) | Self::Drop => &[],
        }
    }

    /// Whether the record proceeds downstream.
    pub fn is_kept(&self) -> bool {
        matches!(self, Self::Keep(_) | Self::KeepWithError(..))
    }
}

impl<T> From<RecordResponse<T>> for RecordOutcome<T> {
    fn from(response: RecordResponse<T>) -> Self {
        match (response.data, response.errors) {
            (Some(data), None) => Self::Keep(data),
            (Some(data), Some(errors)) => Self::KeepWithError(data, errors),
            (None, None) => Self::Drop,
            (None, Some(errors)) => Self::DropWithError(errors),
        }
    }
}

impl<T> From<RecordOutcome<T>> for RecordResponse<T> {
    fn from(outcome: RecordOutcome<T>) -> Self {
        match outcome {
            RecordOutcome::Keep(data) => Self {
                data: Some(data),
                errors: None,
            },
            RecordOutcome::KeepWithError(data, errors) => Self {
                data: Some(data),
                errors: Some(errors),
            },
            RecordOutcome::Drop => Self::default(),
            RecordOutcome::DropWithError(errors) => Self {
                data: None,
                errors: Some(errors),
            },
        }
    }
}

/// Abnormal termination raised by a hook body.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ScriptFailure {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ScriptFailure {
    /// A failure with the generic `script_error` code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: "script_error".to_string(),
            message: message.into(),
        }
    }

    /// A failure with a specific code.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A failed hook invocation, attributed to its hook and failure scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookFailure {
    /// The hook that failed.
    pub hook: HookPoint,
    /// The unit of work the failure applies to.
    pub scope: FailureScope,
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl HookFailure {
    fn new(hook: HookPoint, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hook,
            scope: hook.failure_scope(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// The hook body terminated abnormally.
    pub fn from_script(hook: HookPoint, failure: ScriptFailure) -> Self {
        Self::new(hook, failure.code, failure.message)
    }

    /// The hook's reply broke its contract.
    pub fn from_violation(hook: HookPoint, violation: &ContractViolation) -> Self {
        Self::new(hook, violation.code(), violation.to_string())
    }

    /// The hook did not return within its time budget.
    pub fn timeout(hook: HookPoint, seconds: u64) -> Self {
        Self::new(
            hook,
            "timeout",
            format!("Hook '{hook}' did not return within {seconds} seconds"),
        )
    }

    /// No handler is bound and the hook has no pass-through default.
    pub fn no_handler(hook: HookPoint) -> Self {
        Self::new(hook, "no_handler", format!("No handler bound for hook '{hook}'"))
    }

    /// The host built an input the contract does not allow.
    pub fn invalid_input(hook: HookPoint, error: &AppError) -> Self {
        Self::new(hook, "invalid_input", error.message.clone())
    }

    /// The failure as an error record, for reporting on the error screen.
    pub fn to_error_record(&self) -> ErrorRecord {
        ErrorRecord::new(self.code.clone(), self.message.clone(), self.hook.as_str())
    }
}

impl std::fmt::Display for HookFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} failed ({} scope): {}: {}",
            self.hook, self.scope, self.code, self.message
        )
    }
}

impl From<HookFailure> for AppError {
    fn from(failure: HookFailure) -> Self {
        match failure.code.as_str() {
            "timeout" => AppError::timeout(failure.to_string()),
            "invalid_input" => AppError::validation(failure.to_string()),
            code if ContractViolation::is_contract_code(code) => {
                AppError::contract(failure.to_string())
            }
            _ => AppError::script(failure.to_string()),
        }
    }
}

/// Result of one hook invocation wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome<T> {
    /// The hook returned a valid reply.
    Success(T),
    /// The single record or request failed; siblings are unaffected.
    Recoverable(HookFailure),
    /// The page or the whole flow is aborted.
    Fatal(HookFailure),
}

impl<T> HookOutcome<T> {
    /// Route a failure to `Recoverable` or `Fatal` by its scope.
    pub fn from_failure(failure: HookFailure) -> Self {
        if failure.scope.is_fatal() {
            Self::Fatal(failure)
        } else {
            Self::Recoverable(failure)
        }
    }

    /// Whether the hook succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether the unit of work above the single item is aborted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&HookFailure> {
        match self {
            Self::Success(_) => None,
            Self::Recoverable(failure) | Self::Fatal(failure) => Some(failure),
        }
    }

    /// Convert into a plain result.
    pub fn into_result(self) -> Result<T, HookFailure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Recoverable(failure) | Self::Fatal(failure) => Err(failure),
        }
    }

    /// Map the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> HookOutcome<U> {
        match self {
            Self::Success(value) => HookOutcome::Success(f(value)),
            Self::Recoverable(failure) => HookOutcome::Recoverable(failure),
            Self::Fatal(failure) => HookOutcome::Fatal(failure),
        }
    }
}

//! Hook system: catalog, contracts, outcomes, registry, and dispatcher.

pub mod contracts;
pub mod definitions;
pub mod dispatcher;
pub mod outcome;
pub mod reconcile;
pub mod registry;
pub mod violation;

pub use definitions::{FailureScope, HookFamily, HookPoint, HookReply, HookRequest, InvocationUnit};
pub use dispatcher::HookDispatcher;
pub use outcome::{HookFailure, HookOutcome, RecordOutcome, RecordResponse, ScriptFailure};
pub use registry::{HookHandler, HookRegistry};
pub use violation::ContractViolation;

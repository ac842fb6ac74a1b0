//! # flowhook-hooks
//!
//! The hook contract registry for Flowhook. Provides:
//!
//! - The catalog of extension points ([`HookPoint`]) with the unit of work
//!   each is invoked for and the scope an abnormal termination fails
//! - Typed option/response contracts for every hook, with validation
//! - Per-record outcomes and host-side page reconciliation
//! - A registry binding one script handler per hook point
//! - A dispatcher that invokes handlers and reports
//!   success / recoverable / fatal outcomes

pub mod api;
pub mod hooks;

pub use api::context::HookContext;
pub use hooks::definitions::{
    FailureScope, HookFamily, HookPoint, HookReply, HookRequest, InvocationUnit,
};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::outcome::{HookFailure, HookOutcome, RecordOutcome, RecordResponse, ScriptFailure};
pub use hooks::reconcile::{
    FilterReport, KeptRecord, PageReconciliation, RecordError, RecordFailure, TransformReport,
    reconcile_records,
};
pub use hooks::registry::{HookHandler, HookRegistry};
pub use hooks::violation::ContractViolation;

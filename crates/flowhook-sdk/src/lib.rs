//! # flowhook-sdk
//!
//! SDK for writing Flowhook hook handlers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowhook_sdk::prelude::*;
//!
//! let registry = HookRegistry::new();
//!
//! typed::pre_map("tagger", |options| async move {
//!     Ok(options
//!         .data
//!         .into_iter()
//!         .map(|mut record| {
//!             record["tag"] = json!("x");
//!             RecordResponse::keep(record)
//!         })
//!         .collect())
//! })
//! .bind(&registry)
//! .await;
//! ```

pub mod macros;
pub mod traits;
pub mod typed;

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};

    pub use flowhook_core::types::{ExportId, FlowId, JobId};
    pub use flowhook_entity::{ErrorRecord, ImportError, ImportResponse, Job, Settings};
    pub use flowhook_hooks::hooks::contracts::branching::BranchingOptions;
    pub use flowhook_hooks::hooks::contracts::filter::FilterOptions;
    pub use flowhook_hooks::hooks::contracts::flow_router::{FlowRoute, FlowRouterOptions};
    pub use flowhook_hooks::hooks::contracts::form_init::{FormDefinition, FormInitOptions};
    pub use flowhook_hooks::hooks::contracts::handle_request::{
        HandleRequestOptions, HandleRequestResponse,
    };
    pub use flowhook_hooks::hooks::contracts::post_aggregate::PostAggregateOptions;
    pub use flowhook_hooks::hooks::contracts::post_map::PostMapOptions;
    pub use flowhook_hooks::hooks::contracts::post_response_map::PostResponseMapOptions;
    pub use flowhook_hooks::hooks::contracts::post_submit::PostSubmitOptions;
    pub use flowhook_hooks::hooks::contracts::pre_map::PreMapOptions;
    pub use flowhook_hooks::hooks::contracts::pre_save_page::{
        NewErrorsAndRetryData, PageError, PreSavePageOptions, PreSavePageResponse,
    };
    pub use flowhook_hooks::hooks::contracts::transform::TransformOptions;
    pub use flowhook_hooks::{
        HookContext, HookHandler, HookPoint, HookRegistry, HookReply, HookRequest,
        RecordResponse, ScriptFailure,
    };

    pub use crate::traits::{ClosureHandler, SimpleHandlerAdapter, SimpleHookHandler};
    pub use crate::typed;
}

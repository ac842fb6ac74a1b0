//! # flowhook
//!
//! Typed hook contracts and host-side dispatch for user scripts running
//! inside integration flows.
//!
//! - [`hooks`]: the hook catalog, contracts, registry, and dispatcher
//! - [`entity`]: shared data shapes (jobs, options, errors, import responses)
//! - [`sdk`]: typed handler constructors for script authors
//!
//! ```rust,ignore
//! use flowhook::prelude::*;
//!
//! let registry = Arc::new(HookRegistry::new());
//! typed::filter("active-only", |o| async move { Ok(o.record["active"] == true) })
//!     .bind(&registry)
//!     .await;
//!
//! let dispatcher = HookDispatcher::new(registry, HostConfig::default());
//! ```

pub use flowhook_core::config::{AppConfig, HostConfig, LoggingConfig};
pub use flowhook_core::{AppError, AppResult};
pub use flowhook_entity as entity;
pub use flowhook_hooks as hooks;
pub use flowhook_sdk as sdk;

/// Everything a host or a script usually needs.
pub mod prelude {
    pub use std::sync::Arc;

    pub use flowhook_core::config::HostConfig;
    pub use flowhook_hooks::hooks::contracts::filter::FilterScope;
    pub use flowhook_hooks::hooks::contracts::post_aggregate::AggregateDelivery;
    pub use flowhook_hooks::{
        FailureScope, HookDispatcher, HookFailure, HookOutcome, PageReconciliation,
    };
    pub use flowhook_sdk::prelude::*;
}

//! API surface handed to hook handlers.

pub mod context;

pub use context::HookContext;

//! # flowhook-core
//!
//! Core crate for Flowhook. Contains the configuration schema and loader,
//! typed identifiers for connections, flows, integrations, exports,
//! imports and jobs, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Flowhook crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

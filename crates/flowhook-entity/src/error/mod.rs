//! Structured error records returned inside hook responses.

pub mod model;

pub use model::{ErrorRecord, ImportError};

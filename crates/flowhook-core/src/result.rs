//! Convenience result type alias for Flowhook.

use crate::error::AppError;

/// A specialized `Result` type for Flowhook operations.
pub type AppResult<T> = Result<T, AppError>;

//! Convenience result type alias for WikiGaia.

use crate::error::AppError;

/// A specialized `Result` type for WikiGaia operations.
pub type AppResult<T> = Result<T, AppError>;

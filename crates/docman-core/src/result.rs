//! Convenience result type alias for Docman.

use crate::error::AppError;

/// A specialized `Result` type for Docman operations.
pub type AppResult<T> = Result<T, AppError>;

//! Convenience result type alias for Waddle.

use crate::error::AppError;

/// A specialized `Result` type for Waddle operations.
pub type AppResult<T> = Result<T, AppError>;

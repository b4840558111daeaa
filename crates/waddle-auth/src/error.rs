//! Token validation failures.

use thiserror::Error;

use waddle_core::error::{AppError, ErrorKind};

/// Why a presented token was rejected.
///
/// Every variant surfaces to HTTP callers as a bare "unauthorized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token could not be parsed at all.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not verify against the secret for the expected kind.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The `exp` claim has passed.
    #[error("token has expired")]
    Expired,
    /// The token verifies but is no longer the one on record for its subject.
    #[error("token has been revoked")]
    Revoked,
    /// The token verifies but carries the other `typ`.
    #[error("token is of the wrong kind")]
    WrongKind,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::with_source(ErrorKind::Authentication, err.to_string(), err)
    }
}

//! Engine-level error taxonomy.
//!
//! Every failure a service can return, each with a distinct externally
//! visible reason. All errors are terminal for the current request; the
//! engine never retries internally.

use std::collections::BTreeMap;

use thiserror::Error;

use gymgrid_auth::{DenyReason, OtpError};
use gymgrid_identity::QuotaExceeded;

/// Result type returned by the application services.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The actor is disallowed for this action. Never retried.
    #[error("permission denied: {0}")]
    PermissionDenied(DenyReason),

    /// Malformed or semantically invalid payload, keyed by field.
    #[error("validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    /// The trainer cap for the branch is already reached.
    #[error(transparent)]
    Quota(#[from] QuotaExceeded),

    /// A referenced record id did not resolve.
    #[error("{0} not found")]
    InvalidReference(&'static str),

    /// A one-time code failed verification.
    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("invalid refresh token")]
    InvalidToken,
}

impl EngineError {
    /// Single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::Validation(errors)
    }

    /// HTTP-style status the boundary convention maps this error to.
    pub fn status(&self) -> u16 {
        match self {
            // A denial caused by a dangling reference reads as 404, not 403.
            EngineError::PermissionDenied(DenyReason::InvalidReference) => 404,
            EngineError::PermissionDenied(_) => 403,
            EngineError::Validation(_) | EngineError::Quota(_) => 400,
            EngineError::InvalidReference(_) => 404,
            EngineError::Otp(_)
            | EngineError::InvalidCredentials
            | EngineError::AccountDisabled
            | EngineError::InvalidToken => 401,
        }
    }
}

impl From<DenyReason> for EngineError {
    fn from(reason: DenyReason) -> Self {
        EngineError::PermissionDenied(reason)
    }
}

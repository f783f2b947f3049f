//! One-time login codes.
//!
//! At most one live code exists per email at any time: issuing a new code
//! supersedes (deletes) any previous row for the address. Codes expire a
//! fixed 120 seconds after creation. The attempts counter is tracked but no
//! lockout threshold is enforced here; that is left to caller policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gymgrid_core::Email;

/// Seconds a code stays valid after issuance.
pub const OTP_TTL_SECONDS: i64 = 120;

/// A live one-time code bound to an email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub email: Email,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub attempts: u32,
}

impl OtpRecord {
    pub fn new(email: Email, code: String, now: DateTime<Utc>) -> Self {
        Self {
            email,
            code,
            created_at: now,
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.created_at).num_seconds() > OTP_TTL_SECONDS
    }
}

/// Distinct, externally visible verification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("verification code has expired")]
    Expired,

    #[error("verification code does not match")]
    Mismatch,

    #[error("no verification code found for this email")]
    NotFound,
}

/// Pure verification of a candidate code against the live record (if any).
///
/// Expiry wins over a mismatching code: a stale row is reported as `Expired`
/// regardless of what was submitted or how many attempts were made.
pub fn verify(record: Option<&OtpRecord>, code: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
    let record = record.ok_or(OtpError::NotFound)?;
    if record.is_expired(now) {
        return Err(OtpError::Expired);
    }
    if record.code != code {
        return Err(OtpError::Mismatch);
    }
    Ok(())
}

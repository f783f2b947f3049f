use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gymgrid_core::{BranchId, UserId};

use crate::{Identity, Role};

/// Access/refresh token pair handed back after login or refresh.
///
/// Both values are opaque strings: the engine never inspects their contents
/// beyond trusting the actor identity they resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Decoded access-token claims.
///
/// Signature verification and wire format live outside this crate; these are
/// the claims GymGrid expects once middleware has decoded a token. They are
/// projected into an [`Identity`] via [`AccessClaims::actor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    pub role: Role,

    pub branch_id: Option<BranchId>,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token time window is inverted (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token is not valid yet (issued_at is in the future)")]
    NotYetValid,

    #[error("token has expired")]
    Expired,
}

impl AccessClaims {
    /// Check the claim time window against `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
        if self.expires_at <= self.issued_at {
            Err(TokenValidationError::InvalidTimeWindow)
        } else if now < self.issued_at {
            Err(TokenValidationError::NotYetValid)
        } else if now >= self.expires_at {
            Err(TokenValidationError::Expired)
        } else {
            Ok(())
        }
    }

    /// Validate and project the claims into an actor identity.
    ///
    /// Claims carry no activity/verification flags; callers that track
    /// account state cross-check the projected actor against their store.
    pub fn actor(&self, now: DateTime<Utc>) -> Result<Identity, TokenValidationError> {
        self.validate(now)?;
        Ok(Identity::new(self.sub, self.role, self.branch_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> AccessClaims {
        AccessClaims {
            sub: UserId::new(),
            role: Role::Trainer,
            branch_id: Some(BranchId::new()),
            issued_at,
            expires_at,
        }
    }

    #[test]
    fn claims_inside_the_window_project_an_actor() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(5), now + Duration::minutes(5));

        let actor = c.actor(now).unwrap();
        assert_eq!(actor.user_id, c.sub);
        assert_eq!(actor.role, Role::Trainer);
        assert_eq!(actor.branch_id, c.branch_id);
    }

    #[test]
    fn expired_claims_are_rejected() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(10), now - Duration::minutes(5));
        assert_eq!(c.actor(now).unwrap_err(), TokenValidationError::Expired);
    }

    #[test]
    fn future_issuance_is_rejected() {
        let now = Utc::now();
        let c = claims(now + Duration::minutes(1), now + Duration::minutes(10));
        assert_eq!(c.validate(now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let c = claims(now, now);
        assert_eq!(c.validate(now), Err(TokenValidationError::InvalidTimeWindow));
    }
}

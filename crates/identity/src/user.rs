use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gymgrid_auth::{Identity, NewUserGrant, Role};
use gymgrid_core::{BranchId, DomainError, DomainResult, Email, UserId};

/// Minimum password length accepted at account creation.
///
/// Hashing itself is delegated to a credential collaborator; only the length
/// rule is a domain concern.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A user account.
///
/// # Invariants
/// - Email is unique across all accounts (enforced by the identity store).
/// - `branch_id == None` is only meaningful for admins; branch-scoped roles
///   without a branch resolve to scopes that match nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub branch_id: Option<BranchId>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Build the account a creation grant describes.
    ///
    /// The grant comes out of the policy engine, so role and branch here are
    /// what was *granted*, not necessarily what the payload asked for.
    pub fn from_grant(email: Email, grant: NewUserGrant, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email,
            role: grant.role,
            branch_id: grant.branch_id,
            is_active: true,
            is_verified: false,
            created_at: now,
        }
    }

    /// Projection consumed by the policy engine and scope resolver.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            role: self.role,
            branch_id: self.branch_id,
            is_active: self.is_active,
            is_verified: self.is_verified,
        }
    }
}

/// Payload for creating a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub branch_id: Option<BranchId>,
}

impl CreateUser {
    /// Normalized email, or a validation failure for the `email` field.
    pub fn normalized_email(&self) -> DomainResult<Email> {
        Email::parse(&self.email)
    }

    /// Password length rule, or a validation failure for the `password`
    /// field.
    pub fn validate_password(&self) -> DomainResult<()> {
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

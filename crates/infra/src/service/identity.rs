use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use gymgrid_auth::{AccessClaims, DenyReason, Identity, OtpRecord, RecordKind, TokenPair, policy, scope};
use gymgrid_core::{AddressId, UserId};
use gymgrid_identity::{Address, AddressPatch, CreateUser, NewAddress, UserAccount, UserProfile};

use crate::error::{EngineError, EngineResult};
use crate::store::{AddressStore, BranchStore, CreateUserError, IdentityStore, OtpStore};
use crate::token::{CredentialStore, TokenIssuer};

/// User accounts, login, one-time codes, and addresses.
pub struct IdentityService {
    users: Arc<dyn IdentityStore>,
    branches: Arc<dyn BranchStore>,
    addresses: Arc<dyn AddressStore>,
    credentials: Arc<dyn CredentialStore>,
    otps: Arc<dyn OtpStore>,
    tokens: Arc<dyn TokenIssuer>,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn IdentityStore>,
        branches: Arc<dyn BranchStore>,
        addresses: Arc<dyn AddressStore>,
        credentials: Arc<dyn CredentialStore>,
        otps: Arc<dyn OtpStore>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            branches,
            addresses,
            credentials,
            otps,
            tokens,
        }
    }

    /// Resolve an actor identity for a request collaborator.
    pub fn actor(&self, user_id: UserId) -> EngineResult<Identity> {
        self.users
            .get_user(user_id)
            .map(|account| account.identity())
            .ok_or(EngineError::InvalidReference("user"))
    }

    /// Resolve an actor from decoded access-token claims.
    ///
    /// The claim window is checked first, then the projected actor is
    /// cross-checked against the stored account so deactivated users cannot
    /// keep acting on a still-live token.
    pub fn actor_from_claims(
        &self,
        claims: &AccessClaims,
        now: DateTime<Utc>,
    ) -> EngineResult<Identity> {
        let projected = claims.actor(now).map_err(|_| EngineError::InvalidToken)?;
        let account = self
            .users
            .get_user(projected.user_id)
            .ok_or(EngineError::InvalidToken)?;
        if !account.is_active {
            return Err(EngineError::AccountDisabled);
        }
        Ok(account.identity())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────

    /// Create a user account on behalf of `actor`.
    ///
    /// The policy engine decides the granted role/branch (a manager's
    /// payload branch is overridden by their own); the identity store
    /// enforces email uniqueness and the trainer quota atomically.
    pub fn create_user(
        &self,
        actor: &Identity,
        cmd: CreateUser,
        now: DateTime<Utc>,
    ) -> EngineResult<UserAccount> {
        let grant = policy::authorize_create_user(actor, cmd.role, cmd.branch_id).map_err(
            |reason| match reason {
                // An out-of-grant role reads as a field validation failure
                // on `role`, not a 403.
                DenyReason::RoleOutsideGrant => {
                    EngineError::validation("role", DenyReason::RoleOutsideGrant.to_string())
                }
                other => EngineError::PermissionDenied(other),
            },
        )?;

        let email = cmd
            .normalized_email()
            .map_err(|e| EngineError::validation("email", e.to_string()))?;
        cmd.validate_password()
            .map_err(|e| EngineError::validation("password", e.to_string()))?;

        // Admin-chosen branches must resolve; granted branches from the
        // actor's own assignment are trusted.
        if actor.is_admin() {
            if let Some(branch_id) = grant.branch_id {
                if self.branches.get_branch(branch_id).is_none() {
                    return Err(EngineError::validation(
                        "branch_id",
                        "referenced branch does not exist",
                    ));
                }
            }
        }

        let account = UserAccount::from_grant(email, grant, now);
        let account = self.users.create_user(account).map_err(|e| match e {
            CreateUserError::DuplicateEmail => EngineError::validation("email", e.to_string()),
            CreateUserError::Quota(quota) => EngineError::Quota(quota),
        })?;
        self.credentials.set_password(account.id, &cmd.password);

        info!(user_id = %account.id, role = %account.role, "user created");
        Ok(account)
    }

    /// List accounts visible to `actor` (admin: all; manager: own branch).
    pub fn list_users(&self, actor: &Identity) -> EngineResult<Vec<UserAccount>> {
        let scope = scope::scope(actor, RecordKind::Users);
        if scope.is_forbidden() {
            return Err(DenyReason::RoleNotAllowed(actor.role).into());
        }
        Ok(self
            .users
            .list_users()
            .into_iter()
            .filter(|u| scope.matches_branch(u.branch_id))
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Login
    // ─────────────────────────────────────────────────────────────────────

    pub fn login(&self, email: &str, password: &str) -> EngineResult<(UserAccount, TokenPair)> {
        let account = self.account_for_login(email)?;
        if !self.credentials.verify_password(account.id, password) {
            warn!(email = %account.email, "failed password login");
            return Err(EngineError::InvalidCredentials);
        }
        let pair = self.tokens.issue(account.id);
        Ok((account, pair))
    }

    pub fn refresh(&self, refresh_token: &str) -> EngineResult<TokenPair> {
        self.tokens
            .refresh(refresh_token)
            .ok_or(EngineError::InvalidToken)
    }

    /// Start an OTP login: supersede any live code for the address and
    /// issue a fresh one.
    pub fn request_login_code(&self, email: &str, now: DateTime<Utc>) -> EngineResult<OtpRecord> {
        let account = self.account_for_login(email)?;
        let record = self.otps.issue(&account.email, now);
        info!(email = %account.email, "login code issued");
        Ok(record)
    }

    /// Complete an OTP login: verify the code, mark the account verified,
    /// and hand out tokens.
    pub fn verify_login_code(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<(UserAccount, TokenPair)> {
        let account = self.account_for_login(email)?;
        self.otps.verify(&account.email, code, now)?;
        self.users.mark_verified(account.id);
        let pair = self.tokens.issue(account.id);
        let account = self
            .users
            .get_user(account.id)
            .ok_or(EngineError::InvalidReference("user"))?;
        Ok((account, pair))
    }

    fn account_for_login(&self, email: &str) -> EngineResult<UserAccount> {
        let email = gymgrid_core::Email::parse(email)
            .map_err(|_| EngineError::InvalidCredentials)?;
        let account = self
            .users
            .find_by_email(&email)
            .ok_or(EngineError::InvalidCredentials)?;
        if !account.is_active {
            return Err(EngineError::AccountDisabled);
        }
        Ok(account)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Profiles (owner-scoped)
    // ─────────────────────────────────────────────────────────────────────

    /// The actor's own profile, created empty alongside the account.
    pub fn profile(&self, actor: &Identity) -> EngineResult<UserProfile> {
        self.users
            .get_profile(actor.user_id)
            .ok_or(EngineError::InvalidReference("user"))
    }

    pub fn update_profile(
        &self,
        actor: &Identity,
        profile: UserProfile,
    ) -> EngineResult<UserProfile> {
        if !self.users.set_profile(actor.user_id, profile.clone()) {
            return Err(EngineError::InvalidReference("user"));
        }
        Ok(profile)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Addresses (owner-scoped)
    // ─────────────────────────────────────────────────────────────────────

    pub fn list_addresses(&self, actor: &Identity) -> Vec<Address> {
        self.addresses.list_addresses(actor.user_id)
    }

    pub fn add_address(
        &self,
        actor: &Identity,
        new: NewAddress,
        now: DateTime<Utc>,
    ) -> EngineResult<Address> {
        if new.label.trim().is_empty() {
            return Err(EngineError::validation("label", "label cannot be empty"));
        }
        Ok(self.addresses.insert_address(actor.user_id, new, now))
    }

    pub fn update_address(
        &self,
        actor: &Identity,
        id: AddressId,
        patch: AddressPatch,
        now: DateTime<Utc>,
    ) -> EngineResult<Address> {
        self.addresses
            .update_address(actor.user_id, id, patch, now)
            .map_err(|e| match e {
                gymgrid_core::DomainError::NotFound => EngineError::InvalidReference("address"),
                other => EngineError::validation("is_default", other.to_string()),
            })
    }

    pub fn remove_address(&self, actor: &Identity, id: AddressId) -> EngineResult<()> {
        self.addresses
            .remove_address(actor.user_id, id)
            .map_err(|_| EngineError::InvalidReference("address"))
    }
}

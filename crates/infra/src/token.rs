//! Opaque token issuance and credential verification contracts.
//!
//! Token wire format and signature crypto are external; the engine only
//! hands tokens out and trusts the identity they resolve to. Password
//! hashing is likewise delegated; the trait below only answers "does this
//! password match".

use gymgrid_auth::TokenPair;
use gymgrid_core::UserId;

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: UserId) -> TokenPair;

    /// Rotate a refresh token. `None` when the token is unknown or already
    /// rotated.
    fn refresh(&self, refresh_token: &str) -> Option<TokenPair>;
}

pub trait CredentialStore: Send + Sync {
    fn set_password(&self, user_id: UserId, password: &str);
    fn verify_password(&self, user_id: UserId, password: &str) -> bool;
}

//! `gymgrid-auth` — pure authorization and authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it decides
//! *whether* an actor may act and *which* records they may see, given nothing
//! but the actor's identity projection and the target's attributes.

pub mod claims;
pub mod identity;
pub mod otp;
pub mod policy;
pub mod role;
pub mod scope;

pub use claims::{AccessClaims, TokenPair, TokenValidationError};
pub use identity::Identity;
pub use otp::{OtpError, OtpRecord, OTP_TTL_SECONDS};
pub use policy::{Decision, DenyReason, NewUserGrant};
pub use role::Role;
pub use scope::{RecordKind, Scope};

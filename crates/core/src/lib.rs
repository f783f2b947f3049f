//! `gymgrid-core` — shared domain primitives.
//!
//! Typed identifiers, the domain error model, and small value objects used by
//! every other crate. No infrastructure concerns live here.

pub mod email;
pub mod error;
pub mod id;

pub use email::Email;
pub use error::{DomainError, DomainResult};
pub use id::{AddressId, BranchId, PlanId, TaskId, UserId};

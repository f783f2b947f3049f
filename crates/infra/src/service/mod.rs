//! Application services: one per bounded area.
//!
//! Per request, a service resolves the actor, loads candidate records,
//! consults the policy engine / scope resolver, applies the relevant
//! invariant manager, and persists through the store traits. No service
//! retries internally; every error is terminal for the request.

mod branch;
mod identity;
mod workout;

pub use branch::BranchService;
pub use identity::IdentityService;
pub use workout::WorkoutService;

//! `gymgrid-infra` — collaborator contracts and application services.
//!
//! The engine crates (`gymgrid-auth`, `gymgrid-identity`, `gymgrid-workouts`)
//! are pure; this crate supplies what they are wired to at runtime: store
//! traits with in-memory implementations honoring the atomicity discipline
//! (quota reserve, address default swap, OTP supersede), opaque token
//! issuance, the response envelope convention, and the services that compose
//! policy + stores per request.

pub mod envelope;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod token;

pub use envelope::Envelope;
pub use error::{EngineError, EngineResult};
pub use memory::{
    InMemoryAddressStore, InMemoryBranchStore, InMemoryCredentialStore, InMemoryIdentityStore,
    InMemoryOtpStore, InMemoryPlanStore, InMemoryTaskStore, InMemoryTokenIssuer,
};
pub use service::{BranchService, IdentityService, WorkoutService};
pub use store::{
    AddressStore, BranchStore, CreateUserError, IdentityStore, OtpStore, PlanStore, TaskStore,
};
pub use token::{CredentialStore, TokenIssuer};

//! `gymgrid-identity` — user accounts and their per-user invariants.
//!
//! Account records, the trainer-per-branch quota, the single-default address
//! book, and the profile record. Creation *policy* (who may create whom)
//! lives in `gymgrid-auth`; this crate owns the record shapes and the
//! invariants that must hold after any mutation.

pub mod address;
pub mod profile;
pub mod quota;
pub mod user;

pub use address::{Address, AddressBook, AddressPatch, NewAddress};
pub use profile::UserProfile;
pub use quota::{QuotaExceeded, TRAINER_CAP, check_trainer_slot};
pub use user::{CreateUser, UserAccount};

//! `gymgrid-branches` — gym branch records.

pub mod branch;

pub use branch::{CreateBranch, GymBranch};

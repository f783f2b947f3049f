//! Trainer-per-branch quota.
//!
//! The check itself is pure; the identity store evaluates it atomically with
//! the insert (count + insert under one lock) so concurrent creations cannot
//! both observe a free slot. The quota is only consulted on trainer
//! creation; role changes and deletions never release or re-check slots.

use thiserror::Error;

/// Hard cap on trainers per branch.
pub const TRAINER_CAP: usize = 3;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("this branch already has {TRAINER_CAP} trainers (maximum limit)")]
pub struct QuotaExceeded;

/// Check whether one more trainer fits given the committed count.
pub fn check_trainer_slot(current_count: usize) -> Result<(), QuotaExceeded> {
    if current_count >= TRAINER_CAP {
        Err(QuotaExceeded)
    } else {
        Ok(())
    }
}

//! Collaborator store contracts.
//!
//! The engine depends on these narrow traits; persistence mechanics are
//! entirely delegated. In-memory implementations for tests and development
//! live in [`crate::memory`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use gymgrid_auth::{OtpError, OtpRecord};
use gymgrid_branches::GymBranch;
use gymgrid_core::{AddressId, BranchId, DomainResult, Email, PlanId, TaskId, UserId};
use gymgrid_identity::{Address, AddressPatch, NewAddress, QuotaExceeded, UserAccount, UserProfile};
use gymgrid_workouts::{TaskStatus, WorkoutPlan, WorkoutTask};

/// Failure modes of the atomic account insert.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateUserError {
    #[error("a user with this email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Quota(#[from] QuotaExceeded),
}

/// Account storage.
///
/// `create_user` must evaluate email uniqueness and the trainer quota
/// against committed state in the same critical section as the insert:
/// two concurrent trainer creations may not both observe a free slot.
pub trait IdentityStore: Send + Sync {
    fn get_user(&self, id: UserId) -> Option<UserAccount>;
    fn find_by_email(&self, email: &Email) -> Option<UserAccount>;
    fn count_trainers(&self, branch_id: BranchId) -> usize;
    fn create_user(&self, account: UserAccount) -> Result<UserAccount, CreateUserError>;
    /// Flag an account as verified after a successful OTP login.
    fn mark_verified(&self, id: UserId) -> bool;
    fn list_users(&self) -> Vec<UserAccount>;

    /// The profile kept alongside the account (created empty with it).
    fn get_profile(&self, id: UserId) -> Option<UserProfile>;
    /// Replace the profile. `false` when the account does not exist.
    fn set_profile(&self, id: UserId, profile: UserProfile) -> bool;
}

pub trait BranchStore: Send + Sync {
    fn get_branch(&self, id: BranchId) -> Option<GymBranch>;
    fn insert_branch(&self, branch: GymBranch);
    fn list_branches(&self) -> Vec<GymBranch>;
}

pub trait PlanStore: Send + Sync {
    fn get_plan(&self, id: PlanId) -> Option<WorkoutPlan>;
    fn insert_plan(&self, plan: WorkoutPlan);
    fn list_plans(&self) -> Vec<WorkoutPlan>;
}

pub trait TaskStore: Send + Sync {
    fn get_task(&self, id: TaskId) -> Option<WorkoutTask>;
    fn insert_task(&self, task: WorkoutTask);
    /// Returns the updated task, or `None` when the id does not resolve.
    fn set_status(&self, id: TaskId, status: TaskStatus) -> Option<WorkoutTask>;
    fn list_tasks(&self) -> Vec<WorkoutTask>;
}

/// Address storage. Each mutation normalizes the owner's whole address set
/// (single-default invariant) atomically.
pub trait AddressStore: Send + Sync {
    fn list_addresses(&self, user_id: UserId) -> Vec<Address>;
    fn insert_address(&self, user_id: UserId, new: NewAddress, now: DateTime<Utc>) -> Address;
    fn update_address(
        &self,
        user_id: UserId,
        id: AddressId,
        patch: AddressPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Address>;
    fn remove_address(&self, user_id: UserId, id: AddressId) -> DomainResult<()>;
}

/// One-time code storage.
pub trait OtpStore: Send + Sync {
    /// Atomically supersede any live code for `email` and install a fresh
    /// one, invalidating every previously issued code for that address.
    fn issue(&self, email: &Email, now: DateTime<Utc>) -> OtpRecord;

    /// Verify a candidate code; consumes the row on success, increments the
    /// attempts counter on mismatch.
    fn verify(&self, email: &Email, code: &str, now: DateTime<Utc>) -> Result<(), OtpError>;

    /// The live code for `email`, if any.
    fn live(&self, email: &Email) -> Option<OtpRecord>;
}

//! Policy engine: the central rule table.
//!
//! Every mutating operation funnels through one of the `authorize_*`
//! functions below. They are pure: given the actor's identity projection and
//! the target's attributes they return a [`Decision`] (or a forced value plus
//! a possible [`DenyReason`]) and never touch storage.
//!
//! Admin bypasses all branch-scoping checks.

use serde::Serialize;
use thiserror::Error;

use gymgrid_core::{BranchId, UserId};

use crate::{Identity, Role};

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert into a `Result` for use with `?` at call sites.
    pub fn require(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Machine-readable reason a request was denied.
///
/// Each variant carries a distinct, externally visible message; callers never
/// retry a denial.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    #[error("role '{0}' may not perform this action")]
    RoleNotAllowed(Role),

    #[error("managers may only create trainers or members")]
    RoleOutsideGrant,

    #[error("actor has no branch assignment")]
    MissingBranch,

    #[error("referenced branch does not exist")]
    InvalidReference,

    #[error("workout plan belongs to another branch")]
    CrossBranchPlan,

    #[error("member belongs to another branch")]
    CrossBranchMember,

    #[error("tasks can only be assigned to members")]
    InvalidAssignee,

    #[error("task is assigned to another member")]
    NotAssignee,
}

/// The role/branch a newly created user is actually granted.
///
/// For manager-created users the branch in the payload is overridden by the
/// manager's own branch; the grant records what will be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewUserGrant {
    pub role: Role,
    pub branch_id: Option<BranchId>,
}

/// Who may create users, with which roles, in which branch.
///
/// - Admin: any role, any branch (as requested).
/// - Manager: only trainers and members, always in the manager's own branch
///   regardless of the requested branch.
/// - Trainer/member: denied.
pub fn authorize_create_user(
    actor: &Identity,
    requested_role: Role,
    requested_branch: Option<BranchId>,
) -> Result<NewUserGrant, DenyReason> {
    match actor.role {
        Role::Admin => Ok(NewUserGrant {
            role: requested_role,
            branch_id: requested_branch,
        }),
        Role::Manager => {
            if !matches!(requested_role, Role::Trainer | Role::Member) {
                return Err(DenyReason::RoleOutsideGrant);
            }
            Ok(NewUserGrant {
                role: requested_role,
                branch_id: actor.branch_id,
            })
        }
        role => Err(DenyReason::RoleNotAllowed(role)),
    }
}

/// Who may create workout plans, and in which branch the plan lands.
///
/// Trainers always create in their own branch (a payload branch is ignored).
/// Admins must name an existing branch explicitly; `requested_resolves`
/// reports whether the id was looked up successfully by the caller.
pub fn authorize_create_plan(
    actor: &Identity,
    requested_branch: Option<BranchId>,
    requested_resolves: bool,
) -> Result<BranchId, DenyReason> {
    match actor.role {
        Role::Trainer => actor.branch_id.ok_or(DenyReason::MissingBranch),
        Role::Admin => {
            let branch = requested_branch.ok_or(DenyReason::InvalidReference)?;
            if !requested_resolves {
                return Err(DenyReason::InvalidReference);
            }
            Ok(branch)
        }
        role => Err(DenyReason::RoleNotAllowed(role)),
    }
}

/// Who may assign a workout task to a member.
///
/// Admin bypasses the remaining checks. Trainers must stay inside their own
/// branch on both sides of the assignment, and the assignee must actually be
/// a member. Conditions are checked in order; the first failure wins.
pub fn authorize_create_task(
    actor: &Identity,
    plan_branch: BranchId,
    assignee_role: Role,
    assignee_branch: Option<BranchId>,
) -> Decision {
    match actor.role {
        Role::Admin => Decision::Allow,
        Role::Trainer => {
            if actor.branch_id != Some(plan_branch) {
                return Decision::Deny(DenyReason::CrossBranchPlan);
            }
            if actor.branch_id != assignee_branch {
                return Decision::Deny(DenyReason::CrossBranchMember);
            }
            if assignee_role != Role::Member {
                return Decision::Deny(DenyReason::InvalidAssignee);
            }
            Decision::Allow
        }
        role => Decision::Deny(DenyReason::RoleNotAllowed(role)),
    }
}

/// Who may change a task's status.
///
/// - Admin: any task.
/// - Member: only tasks assigned to them.
/// - Trainer: only tasks whose plan lives in their branch.
/// - Manager: never (managers view tasks but do not mutate them).
pub fn authorize_update_task_status(
    actor: &Identity,
    assignee: UserId,
    plan_branch: BranchId,
) -> Decision {
    match actor.role {
        Role::Admin => Decision::Allow,
        Role::Member => {
            if assignee == actor.user_id {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotAssignee)
            }
        }
        Role::Trainer => {
            if actor.branch_id == Some(plan_branch) {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::CrossBranchPlan)
            }
        }
        Role::Manager => Decision::Deny(DenyReason::RoleNotAllowed(Role::Manager)),
    }
}

/// Who may create gym branches: admin only.
pub fn authorize_create_branch(actor: &Identity) -> Decision {
    if actor.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RoleNotAllowed(actor.role))
    }
}

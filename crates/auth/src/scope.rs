//! Scope resolver: which subset of records an actor may list.
//!
//! Deterministic given (actor role, actor branch); never mutates state. The
//! resolved [`Scope`] is applied by the caller as a filter predicate over
//! loaded records.

use gymgrid_core::{BranchId, UserId};

use crate::{Identity, Role};

/// Kinds of listable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Users,
    WorkoutPlans,
    WorkoutTasks,
}

/// Visible subset of a record kind for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every record.
    All,
    /// Records whose branch equals the actor's branch. A branchless actor
    /// matches only records that themselves have no branch.
    Branch(Option<BranchId>),
    /// Records owned by (assigned to) the actor.
    Own(UserId),
    /// The actor may not list this kind at all; surface a denial, not an
    /// empty page.
    Forbidden,
}

impl Scope {
    /// Apply the scope to a record's branch attribute.
    ///
    /// `Own`/`Forbidden` scopes never match by branch; owners are matched
    /// with [`Scope::matches_owner`].
    pub fn matches_branch(&self, record_branch: Option<BranchId>) -> bool {
        match self {
            Scope::All => true,
            Scope::Branch(branch) => *branch == record_branch,
            Scope::Own(_) | Scope::Forbidden => false,
        }
    }

    pub fn matches_owner(&self, owner: UserId) -> bool {
        match self {
            Scope::All => true,
            Scope::Own(user_id) => *user_id == owner,
            Scope::Branch(_) | Scope::Forbidden => false,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Scope::Forbidden)
    }
}

/// Resolve the visible subset for `actor` over `kind`.
pub fn scope(actor: &Identity, kind: RecordKind) -> Scope {
    match kind {
        RecordKind::Users => match actor.role {
            Role::Admin => Scope::All,
            Role::Manager => Scope::Branch(actor.branch_id),
            Role::Trainer | Role::Member => Scope::Forbidden,
        },
        RecordKind::WorkoutPlans => match actor.role {
            Role::Admin => Scope::All,
            Role::Manager | Role::Trainer => Scope::Branch(actor.branch_id),
            // Members are explicitly forbidden, not merely filtered out.
            Role::Member => Scope::Forbidden,
        },
        RecordKind::WorkoutTasks => match actor.role {
            Role::Admin => Scope::All,
            Role::Member => Scope::Own(actor.user_id),
            Role::Manager | Role::Trainer => Scope::Branch(actor.branch_id),
        },
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gymgrid_core::{BranchId, DomainError, DomainResult, PlanId, UserId};

/// A workout plan.
///
/// Owner and branch are fixed at creation: the branch comes from the
/// creating trainer's own branch, or from the explicit payload branch when
/// an admin creates the plan. Neither changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: PlanId,
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub branch_id: BranchId,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a plan.
///
/// `branch_id` is only honored for admins; the policy engine forces a
/// trainer's plan into the trainer's branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlan {
    pub title: String,
    pub description: String,
    pub branch_id: Option<BranchId>,
}

impl WorkoutPlan {
    /// Build a plan in `branch_id` owned by `created_by`.
    ///
    /// The branch is the one *granted* by the policy engine, not the payload
    /// branch.
    pub fn create(
        cmd: CreatePlan,
        created_by: UserId,
        branch_id: BranchId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = cmd.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("plan title cannot be empty"));
        }
        if title.len() > 200 {
            return Err(DomainError::validation("plan title is too long (max 200)"));
        }

        Ok(Self {
            id: PlanId::new(),
            title: title.to_string(),
            description: cmd.description.trim().to_string(),
            created_by,
            branch_id,
            created_at: now,
        })
    }
}

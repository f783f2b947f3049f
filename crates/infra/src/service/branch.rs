use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use gymgrid_auth::{DenyReason, Identity, policy};
use gymgrid_branches::{CreateBranch, GymBranch};
use gymgrid_core::DomainError;

use crate::error::{EngineError, EngineResult};
use crate::store::BranchStore;

/// Gym branch management (admin only).
pub struct BranchService {
    branches: Arc<dyn BranchStore>,
}

impl BranchService {
    pub fn new(branches: Arc<dyn BranchStore>) -> Self {
        Self { branches }
    }

    pub fn create_branch(
        &self,
        actor: &Identity,
        cmd: CreateBranch,
        now: DateTime<Utc>,
    ) -> EngineResult<GymBranch> {
        policy::authorize_create_branch(actor).require()?;

        let branch = GymBranch::create(cmd, now).map_err(|e| match e {
            DomainError::Validation(msg) => EngineError::validation("name", msg),
            other => EngineError::validation("name", other.to_string()),
        })?;

        self.branches.insert_branch(branch.clone());
        info!(branch_id = %branch.id, name = %branch.name, "gym branch created");
        Ok(branch)
    }

    /// Listing branches is admin-only, mirroring creation.
    pub fn list_branches(&self, actor: &Identity) -> EngineResult<Vec<GymBranch>> {
        if !actor.is_admin() {
            return Err(DenyReason::RoleNotAllowed(actor.role).into());
        }
        Ok(self.branches.list_branches())
    }
}

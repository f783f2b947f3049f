use serde::{Deserialize, Serialize};

use gymgrid_core::{BranchId, UserId};

use crate::Role;

/// Read-only projection of an authenticated actor.
///
/// Everything the policy engine and scope resolver need to decide, and
/// nothing more. Construction is decoupled from storage and transport; the
/// identity store derives one from its account record, token middleware can
/// derive one from verified claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
    /// `None` is only meaningful for admins; branch-scoped roles without a
    /// branch assignment resolve to scopes that match nothing.
    pub branch_id: Option<BranchId>,
    pub is_active: bool,
    pub is_verified: bool,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role, branch_id: Option<BranchId>) -> Self {
        Self {
            user_id,
            role,
            branch_id,
            is_active: true,
            is_verified: false,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin, None)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

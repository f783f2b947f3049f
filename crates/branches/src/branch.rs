use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gymgrid_core::{BranchId, DomainError, DomainResult};

/// A gym branch/location.
///
/// Branches are created by admins only (enforced by the policy engine, not
/// here) and own their users and workout plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymBranch {
    pub id: BranchId,
    pub name: String,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBranch {
    pub name: String,
    pub location: String,
}

impl GymBranch {
    pub fn create(cmd: CreateBranch, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("branch name cannot be empty"));
        }
        if name.len() > 100 {
            return Err(DomainError::validation("branch name is too long (max 100)"));
        }

        Ok(Self {
            id: BranchId::new(),
            name: name.to_string(),
            location: cmd.location.trim().to_string(),
            is_active: true,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_active_branch() {
        let branch = GymBranch::create(
            CreateBranch {
                name: "  Downtown  ".into(),
                location: "12 Main St".into(),
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(branch.name, "Downtown");
        assert!(branch.is_active);
    }

    #[test]
    fn rejects_blank_name() {
        let err = GymBranch::create(
            CreateBranch {
                name: "   ".into(),
                location: String::new(),
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}

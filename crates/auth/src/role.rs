use core::str::FromStr;

use serde::{Deserialize, Serialize};

use gymgrid_core::DomainError;

/// Closed set of roles in the organization.
///
/// Kept as a tagged enum rather than opaque strings so the policy rule table
/// can be matched exhaustively and audited in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Trainer,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Trainer => "trainer",
            Role::Member => "member",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "trainer" => Ok(Role::Trainer),
            "member" => Ok(Role::Member),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}': must be admin, manager, trainer or member"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for role in [Role::Admin, Role::Manager, Role::Trainer, Role::Member] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        assert!(matches!(
            "owner".parse::<Role>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Trainer).unwrap(), "\"trainer\"");
    }
}

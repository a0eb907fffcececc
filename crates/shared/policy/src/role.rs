//! Tenant user roles and the capability check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Role of a user inside a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Staff,
}

/// Roles allowed to manage tenant settings and users.
pub const MANAGERS: &[Role] = &[Role::Owner, Role::Admin];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(DomainError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `role` is one of `required`.
pub fn authorize(role: Role, required: &[Role]) -> bool {
    required.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_managers() {
        assert!(authorize(Role::Owner, MANAGERS));
        assert!(authorize(Role::Admin, MANAGERS));
        assert!(!authorize(Role::Staff, MANAGERS));
    }

    #[test]
    fn test_authorize_empty_set_denies_everyone() {
        assert!(!authorize(Role::Owner, &[]));
    }

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Owner, Role::Admin, Role::Staff] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}

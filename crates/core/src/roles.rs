//! Well-known user roles.
//!
//! Role names are stored and transmitted verbatim (`"Admin"`, `"Manager"`,
//! `"Client"`, `"Courier"`) and compared case-sensitively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_MANAGER: &str = "Manager";
pub const ROLE_CLIENT: &str = "Client";
pub const ROLE_COURIER: &str = "Courier";

/// A user's role. The set is closed: there is no "custom" role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Client,
    Courier,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Client, Role::Courier];

    /// The canonical wire/storage name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Client => ROLE_CLIENT,
            Role::Courier => ROLE_COURIER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the four role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MANAGER => Ok(Role::Manager),
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_COURIER => Ok(Role::Courier),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_role() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(
            "client".parse::<Role>(),
            Err(UnknownRole("client".to_string()))
        );
        assert!("ADMIN".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&Role::Courier).unwrap();
        assert_eq!(json, "\"Courier\"");

        let role: Role = serde_json::from_str("\"Manager\"").unwrap();
        assert_eq!(role, Role::Manager);
    }
}

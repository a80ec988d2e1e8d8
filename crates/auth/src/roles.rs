use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// The set is closed: tokens naming any other role fail to decode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Accountant,
    ServiceAdvisor,
    Mechanic,
    Driver,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Manager,
        Role::Accountant,
        Role::ServiceAdvisor,
        Role::Mechanic,
        Role::Driver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Accountant => "accountant",
            Role::ServiceAdvisor => "service_advisor",
            Role::Mechanic => "mechanic",
            Role::Driver => "driver",
        }
    }

    /// Admins are not bound to a tenant and bypass tenant scoping.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Platform administrator with unrestricted access",
            Role::Manager => "Rental company manager with fleet management access",
            Role::Accountant => "Finance staff with read access to fleet and company records",
            Role::ServiceAdvisor => "Workshop service advisor handling vehicle intake",
            Role::Mechanic => "Workshop mechanic updating vehicle condition",
            Role::Driver => "Driver with read access to assigned fleet vehicles",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_their_wire_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert_eq!(
            "superuser".parse::<Role>().unwrap_err(),
            UnknownRole("superuser".to_string())
        );
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for page gating.
///
/// The set is closed: anything the API sends that is not one of these is kept
/// as a [`RoleClaim::Unrecognized`] and reaches no pages at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    TeamLead,
    Executive,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct RoleParseError(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Manager, Role::TeamLead, Role::Executive];

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::TeamLead => "team_lead",
            Role::Executive => "executive",
        }
    }

    /// Human-facing label shown under the user's name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::TeamLead => "Team Lead",
            Role::Executive => "Executive",
        }
    }

    /// Parse a role, accepting the historical `teamlead` spellings.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, RoleParseError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(Role::Manager),
            "team_lead" | "teamlead" | "team-lead" | "team lead" => Ok(Role::TeamLead),
            "executive" => Ok(Role::Executive),
            _ => Err(RoleParseError(raw.to_string())),
        }
    }
}

impl core::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role string a user record carries, as the client understood it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleClaim {
    Known(Role),
    Unrecognized(String),
}

impl RoleClaim {
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleClaim::Known(role) => Some(*role),
            RoleClaim::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RoleClaim::Known(role) => role.as_str(),
            RoleClaim::Unrecognized(raw) => raw,
        }
    }

    /// `team_lead` -> `Team Lead`; unknown claims get the same treatment.
    pub fn display_name(&self) -> String {
        match self {
            RoleClaim::Known(role) => role.display_name().to_string(),
            RoleClaim::Unrecognized(raw) => raw
                .split(['_', ' '])
                .filter(|word| !word.is_empty())
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<Role> for RoleClaim {
    fn from(value: Role) -> Self {
        RoleClaim::Known(value)
    }
}

impl From<String> for RoleClaim {
    fn from(value: String) -> Self {
        match Role::parse(&value) {
            Ok(role) => RoleClaim::Known(role),
            Err(_) => RoleClaim::Unrecognized(value),
        }
    }
}

impl From<RoleClaim> for String {
    fn from(value: RoleClaim) -> Self {
        match value {
            RoleClaim::Known(role) => role.as_str().to_string(),
            RoleClaim::Unrecognized(raw) => raw,
        }
    }
}

impl core::fmt::Display for RoleClaim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

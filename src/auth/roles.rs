//! Actor roles for the fee-rate approval workflow.
//!
//! The platform distinguishes two administrative roles: platform admins who
//! operate CampusPay itself, and school admins who manage a single school.
//! A fee-rate proposal always awaits the counterparty of whoever proposed it.

use serde::{Deserialize, Serialize};

/// Role of an acting administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PlatformAdmin,
    SchoolAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformAdmin => "platform_admin",
            Role::SchoolAdmin => "school_admin",
        }
    }

    /// The role whose approval a proposal by this role awaits.
    pub fn counterparty(&self) -> Role {
        match self {
            Role::PlatformAdmin => Role::SchoolAdmin,
            Role::SchoolAdmin => Role::PlatformAdmin,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "platform_admin" => Ok(Role::PlatformAdmin),
            "school_admin" => Ok(Role::SchoolAdmin),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct RoleParseError(String);

impl std::fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid role: {}", self.0)
    }
}

impl std::error::Error for RoleParseError {}

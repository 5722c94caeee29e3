use std::collections::BTreeMap;
use std::str::FromStr;

use remedy_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Permissions enforced by dispatch policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows choosing a controller other than the action default.
    ControllerOverride,
}

impl Permission {
    /// Returns a stable configuration value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ControllerOverride => "controller_override",
        }
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "controller_override" => Ok(Self::ControllerOverride),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// One entry of a role permission list.
///
/// Configuration accepts either a bare name (`- controller_override`) or a
/// keyed flag (`- controller_override: false`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionEntry {
    /// Bare permission name, granted.
    Granted(String),
    /// Explicit permission flags.
    Flags(BTreeMap<String, bool>),
}

impl PermissionEntry {
    /// Returns the decision this entry makes for a permission, if it names it.
    #[must_use]
    pub fn decision_for(&self, permission_name: &str) -> Option<bool> {
        match self {
            Self::Granted(name) => (name == permission_name).then_some(true),
            Self::Flags(flags) => flags.get(permission_name).copied(),
        }
    }
}

/// Flat RBAC role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    name: NonEmptyString,
    permissions: Vec<PermissionEntry>,
}

impl RoleDefinition {
    /// Creates a validated role.
    pub fn new(name: impl Into<String>, permissions: Vec<PermissionEntry>) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            permissions,
        })
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns whether the role holds a permission.
    ///
    /// The first entry naming the permission decides; absence denies.
    #[must_use]
    pub fn grants(&self, permission_name: &str) -> bool {
        self.permissions
            .iter()
            .find_map(|entry| entry.decision_for(permission_name))
            .unwrap_or(false)
    }
}

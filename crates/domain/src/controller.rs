use std::str::FromStr;

use remedy_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Execution environment family of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerType {
    /// Ansible control node.
    Ansible,
    /// The dispatcher host itself.
    Local,
    /// Remote execution endpoint reached over the network.
    Remote,
}

impl ControllerType {
    /// Returns stable type tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ansible => "ansible",
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for ControllerType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ansible" => Ok(Self::Ansible),
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            _ => Err(AppError::Validation(format!(
                "unknown controller type '{value}'"
            ))),
        }
    }
}

/// Named execution target for actions.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerDefinition {
    name: NonEmptyString,
    controller_type: ControllerType,
    settings: Value,
}

impl ControllerDefinition {
    /// Creates a validated controller definition.
    ///
    /// `settings` carries connection details the dispatcher never interprets.
    pub fn new(
        name: impl Into<String>,
        controller_type: ControllerType,
        settings: Value,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            controller_type,
            settings,
        })
    }

    /// Returns the unique controller name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the controller type tag.
    #[must_use]
    pub fn controller_type(&self) -> ControllerType {
        self.controller_type
    }

    /// Returns opaque connection settings.
    #[must_use]
    pub fn settings(&self) -> &Value {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::ControllerType;

    #[test]
    fn controller_type_roundtrip_tag() {
        let restored = ControllerType::from_str(ControllerType::Remote.as_str());
        assert!(matches!(restored, Ok(ControllerType::Remote)));
    }

    #[test]
    fn unknown_controller_type_is_rejected() {
        assert!(ControllerType::from_str("kubernetes").is_err());
    }
}

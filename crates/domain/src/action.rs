use remedy_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered parameter mapping passed to remediation procedures.
pub type ParameterMap = Map<String, Value>;

/// Controller assigned to discovered playbooks.
pub const DISCOVERED_PLAYBOOK_CONTROLLER: &str = "ansible_local";

/// Controller assigned to discovered scripts.
pub const DISCOVERED_SCRIPT_CONTROLLER: &str = "local";

/// Executable kind bound to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Automation playbook run through the configured playbook runner.
    Playbook {
        /// Playbook path handed to the runner as positional target.
        reference: String,
    },
    /// Executable script invoked directly.
    Script {
        /// Script path.
        reference: String,
    },
}

impl ActionKind {
    /// Returns stable kind value.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Playbook { .. } => "playbook",
            Self::Script { .. } => "script",
        }
    }

    /// Returns the executable reference.
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::Playbook { reference } | Self::Script { reference } => reference.as_str(),
        }
    }
}

/// Registered remediation procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDefinition {
    name: NonEmptyString,
    kind: ActionKind,
    default_controller: NonEmptyString,
    parameters: ParameterMap,
}

impl ActionDefinition {
    /// Creates a validated action definition.
    pub fn new(
        name: impl Into<String>,
        kind: ActionKind,
        default_controller: impl Into<String>,
        parameters: ParameterMap,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if kind.reference().trim().is_empty() {
            return Err(AppError::Validation(format!(
                "action '{name}' must reference a {} path",
                kind.kind_name()
            )));
        }

        let default_controller = NonEmptyString::new(default_controller).map_err(|_| {
            AppError::Validation(format!("action '{name}' must declare a default controller"))
        })?;

        Ok(Self {
            name,
            kind,
            default_controller,
            parameters,
        })
    }

    /// Returns the unique action name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the executable kind.
    #[must_use]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Returns the controller used when callers do not override it.
    #[must_use]
    pub fn default_controller(&self) -> &str {
        self.default_controller.as_str()
    }

    /// Returns the static parameters bound to the action.
    #[must_use]
    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    /// Overlays request parameters on top of the static parameters.
    ///
    /// Keys present in both keep the request value. Keys only present in the
    /// static parameters keep their original position.
    #[must_use]
    pub fn merge_parameters(&self, overrides: &ParameterMap) -> ParameterMap {
        let mut merged = self.parameters.clone();
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }

        merged
    }
}

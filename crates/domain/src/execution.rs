use std::time::Duration;

use remedy_core::{AppError, AppResult};
use serde::{Deserialize, Deserializer, Serialize};

use crate::action::{ActionKind, ParameterMap};
use crate::controller::ControllerType;

/// Exit code reported when no process exit status exists.
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// Validated webhook payload asking for one action execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Action name to trigger.
    pub event_type: String,
    /// Optional controller replacing the action default.
    #[serde(default)]
    pub controller_override: Option<String>,
    /// Parameters overlaid on the action static parameters.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parameters: ParameterMap,
    /// Report intended effect without running anything.
    #[serde(default)]
    pub dry_run: bool,
    /// Defer execution until an operator approves it.
    #[serde(default)]
    pub approval_required: bool,
}

impl ExecutionRequest {
    /// Checks request invariants that serde cannot express.
    pub fn validate(&self) -> AppResult<()> {
        if self.event_type.trim().is_empty() {
            return Err(AppError::Validation(
                "invalid payload: event_type must not be empty".to_owned(),
            ));
        }

        Ok(())
    }

    /// Returns the controller override, ignoring blank values.
    #[must_use]
    pub fn controller_override(&self) -> Option<&str> {
        self.controller_override
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<ParameterMap, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<ParameterMap>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Normalized outcome of one execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExecutionResult")]
pub struct ExecutionResult {
    success: bool,
    stdout: String,
    stderr: String,
    exit_code: i32,
    error: Option<String>,
}

impl ExecutionResult {
    /// Result of a process that ran to completion.
    #[must_use]
    pub fn completed(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            success: exit_code == 0,
            stdout,
            stderr,
            exit_code,
            error: None,
        }
    }

    /// Result of an attempt that could not complete.
    #[must_use]
    pub fn failed(error: impl Into<String>, stdout: String, stderr: String) -> Self {
        Self {
            success: false,
            stdout,
            stderr,
            exit_code: SENTINEL_EXIT_CODE,
            error: Some(error.into()),
        }
    }

    /// Synthetic success describing a dry run.
    #[must_use]
    pub fn dry_run(description: String) -> Self {
        Self {
            success: true,
            stdout: description,
            stderr: String::new(),
            exit_code: 0,
            error: None,
        }
    }

    /// Result slot for a request that was never executed.
    #[must_use]
    pub fn not_executed(reason: impl Into<String>) -> Self {
        Self::failed(reason, String::new(), String::new())
    }

    /// Returns whether the attempt succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Returns captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        self.stdout.as_str()
    }

    /// Returns captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        self.stderr.as_str()
    }

    /// Returns the process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Returns the diagnostic for attempts that could not complete.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Coarse status label used by notifications.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if self.success { "success" } else { "failure" }
    }

    /// Human-readable detail: the error text when present, stdout otherwise.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        let detail = self.error.as_deref().unwrap_or(self.stdout.as_str());

        (!detail.trim().is_empty()).then_some(detail)
    }
}

#[derive(Deserialize)]
struct RawExecutionResult {
    success: bool,
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
    exit_code: i32,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawExecutionResult> for ExecutionResult {
    type Error = AppError;

    fn try_from(raw: RawExecutionResult) -> Result<Self, Self::Error> {
        if raw.success && raw.error.is_some() {
            return Err(AppError::Validation(
                "successful execution result must not carry an error".to_owned(),
            ));
        }
        if raw.success && raw.exit_code != 0 {
            return Err(AppError::Validation(format!(
                "successful execution result must exit with 0, got {}",
                raw.exit_code
            )));
        }

        Ok(Self {
            success: raw.success,
            stdout: raw.stdout,
            stderr: raw.stderr,
            exit_code: raw.exit_code,
            error: raw.error,
        })
    }
}

/// Execution mechanism chosen for a resolved action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionTarget {
    /// Run through the playbook runner.
    Playbook {
        /// Playbook path.
        reference: String,
    },
    /// Run the script directly.
    Script {
        /// Script path.
        reference: String,
    },
    /// Hand off to a remote controller.
    Remote {
        /// Action reference forwarded to the remote side.
        reference: String,
        /// Remote controller name.
        controller: String,
    },
}

impl ExecutionTarget {
    /// Chooses the target for an action running on a controller type.
    #[must_use]
    pub fn resolve(kind: &ActionKind, controller: &str, controller_type: ControllerType) -> Self {
        match (kind, controller_type) {
            (_, ControllerType::Remote) => Self::Remote {
                reference: kind.reference().to_owned(),
                controller: controller.to_owned(),
            },
            (ActionKind::Playbook { reference }, _) => Self::Playbook {
                reference: reference.clone(),
            },
            (ActionKind::Script { reference }, _) => Self::Script {
                reference: reference.clone(),
            },
        }
    }

    /// Returns stable target label.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Playbook { .. } => "playbook",
            Self::Script { .. } => "script",
            Self::Remote { .. } => "remote",
        }
    }

    /// Returns the executable reference.
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::Playbook { reference }
            | Self::Script { reference }
            | Self::Remote { reference, .. } => reference.as_str(),
        }
    }
}

/// Fully resolved execution handed to the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// Execution mechanism and reference.
    pub target: ExecutionTarget,
    /// Merged parameters.
    pub parameters: ParameterMap,
    /// Skip side effects and describe the invocation.
    pub dry_run: bool,
    /// Hard wall-clock bound.
    pub timeout: Duration,
}

impl ExecutionPlan {
    /// Deterministic description of what the plan would run.
    #[must_use]
    pub fn describe(&self) -> String {
        let parameters = serde_json::Value::Object(self.parameters.clone());
        format!(
            "[DRY-RUN] Would execute {}: {} with parameters: {}",
            self.target.kind_name(),
            self.target.reference(),
            parameters
        )
    }
}

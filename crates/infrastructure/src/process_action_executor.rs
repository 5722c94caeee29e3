use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use remedy_application::ActionExecutor;
use remedy_domain::{ExecutionPlan, ExecutionResult, ExecutionTarget, ParameterMap};
use serde_json::Value;
use tokio::process::Command;

/// Error reported for actions routed to remote controllers.
pub const REMOTE_NOT_IMPLEMENTED: &str = "remote execution is not implemented";

/// Executor spawning playbook runners and scripts as child processes.
#[derive(Debug)]
pub struct ProcessActionExecutor {
    playbook_runner: String,
    working_dir: PathBuf,
    spawn_count: AtomicU64,
}

impl ProcessActionExecutor {
    /// Creates an executor resolving relative references from `working_dir`.
    #[must_use]
    pub fn new(playbook_runner: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            playbook_runner: playbook_runner.into(),
            working_dir: working_dir.into(),
            spawn_count: AtomicU64::new(0),
        }
    }

    /// Returns how many child processes were spawned so far.
    #[must_use]
    pub fn spawn_count(&self) -> u64 {
        self.spawn_count.load(Ordering::Relaxed)
    }

    fn playbook_command(&self, reference: &str, parameters: &ParameterMap) -> Command {
        let mut command = Command::new(&self.playbook_runner);
        command.arg(reference);
        if !parameters.is_empty() {
            command
                .arg("--extra-vars")
                .arg(Value::Object(parameters.clone()).to_string());
        }
        command
    }

    fn script_command(&self, reference: &str, parameters: &ParameterMap) -> Command {
        let mut command = Command::new(self.working_dir.join(reference));
        command.args(script_arguments(parameters));
        command
    }

    async fn run(&self, mut command: Command, program: &str, timeout: Duration) -> ExecutionResult {
        command
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(error) => {
                tracing::warn!(program, error = %error, "failed to spawn action process");
                return ExecutionResult::failed(
                    format!("failed to spawn '{program}': {error}"),
                    String::new(),
                    String::new(),
                );
            }
        };
        self.spawn_count.fetch_add(1, Ordering::Relaxed);

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                match output.status.code() {
                    Some(exit_code) => ExecutionResult::completed(exit_code, stdout, stderr),
                    None => ExecutionResult::failed(
                        format!("'{program}' was terminated by a signal"),
                        stdout,
                        stderr,
                    ),
                }
            }
            Ok(Err(error)) => ExecutionResult::failed(
                format!("failed to collect output of '{program}': {error}"),
                String::new(),
                String::new(),
            ),
            Err(_) => {
                tracing::warn!(program, timeout_secs = timeout.as_secs(), "action process timed out");
                ExecutionResult::failed(
                    format!("execution timed out after {} seconds", timeout.as_secs()),
                    String::new(),
                    String::new(),
                )
            }
        }
    }
}

/// Flattens parameters into positional script arguments in map order.
///
/// Strings pass through verbatim; other values use their JSON text.
#[must_use]
pub fn script_arguments(parameters: &ParameterMap) -> Vec<String> {
    parameters
        .values()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect()
}

#[async_trait]
impl ActionExecutor for ProcessActionExecutor {
    async fn execute(&self, plan: ExecutionPlan) -> ExecutionResult {
        match &plan.target {
            ExecutionTarget::Remote { controller, .. } => {
                tracing::warn!(
                    controller = controller.as_str(),
                    dry_run = plan.dry_run,
                    "remote execution requested"
                );
                ExecutionResult::failed(REMOTE_NOT_IMPLEMENTED, String::new(), String::new())
            }
            _ if plan.dry_run => ExecutionResult::dry_run(plan.describe()),
            ExecutionTarget::Playbook { reference } => {
                let command = self.playbook_command(reference, &plan.parameters);
                self.run(command, &self.playbook_runner, plan.timeout).await
            }
            ExecutionTarget::Script { reference } => {
                let command = self.script_command(reference, &plan.parameters);
                self.run(command, reference, plan.timeout).await
            }
        }
    }
}

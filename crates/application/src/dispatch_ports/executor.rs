use async_trait::async_trait;
use remedy_domain::{ExecutionPlan, ExecutionResult};

/// Port for running resolved actions against the process boundary.
///
/// Implementations never fail: spawn errors, timeouts and non-zero exits are
/// all reported inside the returned result.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Executes one plan, or describes it when the plan is a dry run.
    async fn execute(&self, plan: ExecutionPlan) -> ExecutionResult;
}

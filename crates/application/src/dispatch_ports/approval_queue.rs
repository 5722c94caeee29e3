use async_trait::async_trait;
use remedy_core::AppResult;
use remedy_domain::{ApprovalDecision, ApprovalEntry, ApprovalId, ApprovalSummary, ExecutionResult};

/// Port for the store of deferred execution requests.
///
/// Implementations guard every operation with one mutual-exclusion domain.
#[async_trait]
pub trait ApprovalQueue: Send + Sync {
    /// Stores a pending entry and returns its identifier.
    async fn enqueue(&self, entry: ApprovalEntry) -> AppResult<ApprovalId>;

    /// Returns one entry including its result.
    async fn get(&self, id: ApprovalId) -> AppResult<Option<ApprovalEntry>>;

    /// Lists entries in creation order without results.
    async fn list(&self) -> AppResult<Vec<ApprovalSummary>>;

    /// Atomically moves a pending entry to a terminal status.
    ///
    /// Exactly one caller observes the transition. Unknown ids yield
    /// `NotFound`; terminal entries yield `Conflict` and stay unchanged.
    async fn resolve(
        &self,
        id: ApprovalId,
        decision: ApprovalDecision,
        resolved_by: &str,
    ) -> AppResult<ApprovalEntry>;

    /// Stores the outcome for an entry resolved by the caller.
    async fn store_result(&self, id: ApprovalId, result: ExecutionResult)
    -> AppResult<ApprovalEntry>;
}

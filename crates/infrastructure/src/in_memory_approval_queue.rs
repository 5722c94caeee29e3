use std::collections::HashMap;

use async_trait::async_trait;
use remedy_application::ApprovalQueue;
use remedy_core::{AppError, AppResult};
use remedy_domain::{ApprovalDecision, ApprovalEntry, ApprovalId, ApprovalSummary, ExecutionResult};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct QueueState {
    order: Vec<ApprovalId>,
    entries: HashMap<ApprovalId, ApprovalEntry>,
}

impl QueueState {
    fn entry_mut(&mut self, id: ApprovalId) -> AppResult<&mut ApprovalEntry> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("approval '{id}' does not exist")))
    }
}

/// Process-local approval queue guarded by a single mutex.
#[derive(Debug, Default)]
pub struct InMemoryApprovalQueue {
    state: Mutex<QueueState>,
}

impl InMemoryApprovalQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApprovalQueue for InMemoryApprovalQueue {
    async fn enqueue(&self, entry: ApprovalEntry) -> AppResult<ApprovalId> {
        let id = entry.id();
        let mut state = self.state.lock().await;
        if state.entries.contains_key(&id) {
            return Err(AppError::Conflict(format!("approval '{id}' already exists")));
        }

        state.order.push(id);
        state.entries.insert(id, entry);
        Ok(id)
    }

    async fn get(&self, id: ApprovalId) -> AppResult<Option<ApprovalEntry>> {
        Ok(self.state.lock().await.entries.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<ApprovalSummary>> {
        let state = self.state.lock().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.entries.get(id))
            .map(ApprovalEntry::summary)
            .collect())
    }

    async fn resolve(
        &self,
        id: ApprovalId,
        decision: ApprovalDecision,
        resolved_by: &str,
    ) -> AppResult<ApprovalEntry> {
        let mut state = self.state.lock().await;
        let entry = state.entry_mut(id)?;
        entry.resolve(decision, resolved_by)?;
        Ok(entry.clone())
    }

    async fn store_result(
        &self,
        id: ApprovalId,
        result: ExecutionResult,
    ) -> AppResult<ApprovalEntry> {
        let mut state = self.state.lock().await;
        let entry = state.entry_mut(id)?;
        entry.attach_result(result)?;
        Ok(entry.clone())
    }
}

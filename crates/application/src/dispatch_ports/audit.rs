use async_trait::async_trait;
use remedy_core::AppResult;
use remedy_domain::{AuditFilter, AuditRecord};

/// Port for the append-only audit trail.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    /// Appends one record as a single atomic write.
    async fn append(&self, record: AuditRecord) -> AppResult<()>;

    /// Returns at most `limit` matching records, most recent first.
    async fn query(&self, filter: &AuditFilter, limit: usize) -> AppResult<Vec<AuditRecord>>;
}

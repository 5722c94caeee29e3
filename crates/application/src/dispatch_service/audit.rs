use remedy_domain::AuditFilter;

use super::*;

/// Number of records returned when the caller gives no limit.
pub const DEFAULT_AUDIT_LIMIT: usize = 100;

impl DispatchService {
    /// Returns matching audit records, most recent first.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
        limit: Option<usize>,
    ) -> AppResult<Vec<AuditRecord>> {
        if filter
            .start
            .zip(filter.end)
            .is_some_and(|(start, end)| start > end)
        {
            return Err(AppError::Validation(
                "audit range start must not be after end".to_owned(),
            ));
        }

        self.audit_recorder
            .query(filter, limit.unwrap_or(DEFAULT_AUDIT_LIMIT))
            .await
    }
}

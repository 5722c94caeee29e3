use chrono::{DateTime, Utc};
use remedy_domain::{
    ApprovalEntry, ApprovalStatus, ApprovalSummary, ExecutionRequest, ExecutionResult,
    ParameterMap,
};
use serde::Serialize;

/// API representation of a queued approval without its result.
#[derive(Debug, Serialize)]
pub struct ApprovalSummaryResponse {
    pub id: String,
    pub action: String,
    pub parameters: ParameterMap,
    pub dry_run: bool,
    pub status: ApprovalStatus,
    pub requested_by: String,
    pub requester_role: String,
    pub controller: String,
    pub created_at: DateTime<Utc>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<ApprovalSummary> for ApprovalSummaryResponse {
    fn from(summary: ApprovalSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            action: summary.action,
            parameters: summary.parameters,
            dry_run: summary.dry_run,
            status: summary.status,
            requested_by: summary.requested_by,
            requester_role: summary.requester_role,
            controller: summary.controller,
            created_at: summary.created_at,
            resolved_by: summary.resolved_by,
            resolved_at: summary.resolved_at,
        }
    }
}

/// API representation of one approval including its payload and result.
#[derive(Debug, Serialize)]
pub struct ApprovalDetailResponse {
    #[serde(flatten)]
    pub summary: ApprovalSummaryResponse,
    pub payload: ExecutionRequest,
    pub result: Option<ExecutionResult>,
}

impl From<ApprovalEntry> for ApprovalDetailResponse {
    fn from(entry: ApprovalEntry) -> Self {
        Self {
            summary: entry.summary().into(),
            payload: entry.request().clone(),
            result: entry.result().cloned(),
        }
    }
}

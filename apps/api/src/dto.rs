mod approvals;
mod audit;
mod dispatch;
mod health;

pub use approvals::{ApprovalDetailResponse, ApprovalSummaryResponse};
pub use audit::AuditQuery;
pub use dispatch::{ExecutionResponse, PendingApprovalResponse, WebhookResponse};
pub use health::{
    DependencyStatus, GenericMessageResponse, HealthResponse, OverrideCapabilityResponse,
    ReadinessChecks, ReadinessResponse,
};

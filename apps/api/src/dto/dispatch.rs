use remedy_application::{DispatchOutcome, ExecutionReport};
use remedy_domain::{ApprovalStatus, ControllerType, ExecutionResult, ParameterMap};
use serde::Serialize;

/// API representation of one executed dispatch.
#[derive(Debug, Serialize)]
pub struct ExecutionResponse {
    pub action: String,
    pub controller: String,
    pub controller_type: ControllerType,
    pub role: String,
    pub parameters: ParameterMap,
    pub dry_run: bool,
    pub execution: ExecutionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
}

impl From<ExecutionReport> for ExecutionResponse {
    fn from(report: ExecutionReport) -> Self {
        Self {
            action: report.action,
            controller: report.controller,
            controller_type: report.controller_type,
            role: report.role,
            parameters: report.parameters,
            dry_run: report.dry_run,
            execution: report.execution,
            approval_id: report.approval_id.map(|id| id.to_string()),
            approval_status: report.approval_status,
        }
    }
}

/// Descriptor returned when a dispatch waits for approval.
#[derive(Debug, Serialize)]
pub struct PendingApprovalResponse {
    pub status: &'static str,
    pub approval_id: String,
}

/// Webhook response body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WebhookResponse {
    Executed(ExecutionResponse),
    Pending(PendingApprovalResponse),
}

impl From<DispatchOutcome> for WebhookResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Executed(report) => Self::Executed(report.into()),
            DispatchOutcome::PendingApproval { approval_id } => {
                Self::Pending(PendingApprovalResponse {
                    status: ApprovalStatus::Pending.as_str(),
                    approval_id: approval_id.to_string(),
                })
            }
        }
    }
}

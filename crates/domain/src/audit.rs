use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ParameterMap;
use crate::approval::{ApprovalId, ApprovalStatus};
use crate::controller::ControllerType;
use crate::execution::ExecutionResult;

/// Immutable line of the audit trail for one terminal dispatch decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Capture timestamp.
    pub timestamp: DateTime<Utc>,
    /// Actor credential.
    pub user: String,
    /// Actor role.
    pub role: String,
    /// Action name.
    pub action: String,
    /// Effective controller name.
    pub controller: String,
    /// Effective controller type.
    pub controller_type: ControllerType,
    /// Merged parameters actually used.
    pub parameters: ParameterMap,
    /// Mirrors `execution.success`.
    pub status: bool,
    /// Execution outcome, or the not-executed result of a rejection.
    pub execution: ExecutionResult,
    /// Client address observed by the transport.
    pub client_ip: Option<String>,
    /// Whether the request was a dry run.
    pub dry_run: bool,
    /// Linked approval entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_id: Option<ApprovalId>,
    /// Terminal status of the linked approval entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
    /// Credential that created the linked approval entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
}

/// Filters applied to audit trail queries. Every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Inclusive lower timestamp bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper timestamp bound.
    pub end: Option<DateTime<Utc>>,
    /// Exact action name.
    pub action: Option<String>,
    /// Exact actor credential.
    pub user: Option<String>,
    /// Exact actor role.
    pub role: Option<String>,
    /// Exact controller name.
    pub controller: Option<String>,
}

impl AuditFilter {
    /// Returns whether a record passes every configured filter.
    #[must_use]
    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.start.is_none_or(|start| record.timestamp >= start)
            && self.end.is_none_or(|end| record.timestamp <= end)
            && equals_if_set(self.action.as_deref(), record.action.as_str())
            && equals_if_set(self.user.as_deref(), record.user.as_str())
            && equals_if_set(self.role.as_deref(), record.role.as_str())
            && equals_if_set(self.controller.as_deref(), record.controller.as_str())
    }
}

fn equals_if_set(expected: Option<&str>, actual: &str) -> bool {
    expected.is_none_or(|expected| expected == actual)
}

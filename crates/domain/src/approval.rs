use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use remedy_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::execution::{ExecutionRequest, ExecutionResult};

/// Approval entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalId(Uuid);

impl ApprovalId {
    /// Creates a random approval identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a transport value into an approval identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| AppError::NotFound(format!("approval '{value}' does not exist")))
    }
}

impl Default for ApprovalId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ApprovalId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle state of an approval entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Waiting for an operator decision.
    Pending,
    /// Approved and executed.
    Approved,
    /// Rejected without execution.
    Rejected,
}

impl ApprovalStatus {
    /// Returns stable status value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether no further transition is allowed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Operator decision on a pending entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// Run the stored request.
    Approve,
    /// Drop the stored request.
    Reject,
}

impl ApprovalDecision {
    /// Status the entry takes after this decision.
    #[must_use]
    pub fn resulting_status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Deferred execution request awaiting operator resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalEntry {
    id: ApprovalId,
    request: ExecutionRequest,
    status: ApprovalStatus,
    requested_by: String,
    requester_role: String,
    controller: String,
    created_at: DateTime<Utc>,
    resolved_by: Option<String>,
    resolved_at: Option<DateTime<Utc>>,
    result: Option<ExecutionResult>,
}

impl ApprovalEntry {
    /// Creates a pending entry with a fresh identifier.
    #[must_use]
    pub fn pending(
        request: ExecutionRequest,
        requested_by: impl Into<String>,
        requester_role: impl Into<String>,
        controller: impl Into<String>,
    ) -> Self {
        Self {
            id: ApprovalId::new(),
            request,
            status: ApprovalStatus::Pending,
            requested_by: requested_by.into(),
            requester_role: requester_role.into(),
            controller: controller.into(),
            created_at: Utc::now(),
            resolved_by: None,
            resolved_at: None,
            result: None,
        }
    }

    /// Moves a pending entry to the decision's terminal status.
    ///
    /// Terminal entries reject every further transition.
    pub fn resolve(&mut self, decision: ApprovalDecision, resolved_by: &str) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "approval '{}' is already {}",
                self.id,
                self.status.as_str()
            )));
        }

        self.status = decision.resulting_status();
        self.resolved_by = Some(resolved_by.to_owned());
        self.resolved_at = Some(Utc::now());
        Ok(())
    }

    /// Stores the outcome of a resolved entry. The slot is written once.
    pub fn attach_result(&mut self, result: ExecutionResult) -> AppResult<()> {
        if !self.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "approval '{}' is still pending",
                self.id
            )));
        }

        if self.result.is_some() {
            return Err(AppError::Conflict(format!(
                "approval '{}' already holds a result",
                self.id
            )));
        }

        self.result = Some(result);
        Ok(())
    }

    /// Returns the entry identifier.
    #[must_use]
    pub fn id(&self) -> ApprovalId {
        self.id
    }

    /// Returns the stored request.
    #[must_use]
    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ApprovalStatus {
        self.status
    }

    /// Returns the requester credential.
    #[must_use]
    pub fn requested_by(&self) -> &str {
        self.requested_by.as_str()
    }

    /// Returns the requester role.
    #[must_use]
    pub fn requester_role(&self) -> &str {
        self.requester_role.as_str()
    }

    /// Returns the controller resolved when the entry was created.
    #[must_use]
    pub fn controller(&self) -> &str {
        self.controller.as_str()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns who resolved the entry.
    #[must_use]
    pub fn resolved_by(&self) -> Option<&str> {
        self.resolved_by.as_deref()
    }

    /// Returns when the entry was resolved.
    #[must_use]
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns the execution outcome once resolved.
    #[must_use]
    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    /// Returns the triage projection without the result.
    #[must_use]
    pub fn summary(&self) -> ApprovalSummary {
        ApprovalSummary {
            id: self.id,
            action: self.request.event_type.clone(),
            parameters: self.request.parameters.clone(),
            dry_run: self.request.dry_run,
            status: self.status,
            requested_by: self.requested_by.clone(),
            requester_role: self.requester_role.clone(),
            controller: self.controller.clone(),
            created_at: self.created_at,
            resolved_by: self.resolved_by.clone(),
            resolved_at: self.resolved_at,
        }
    }
}

/// Approval listing projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalSummary {
    /// Entry identifier.
    pub id: ApprovalId,
    /// Requested action name.
    pub action: String,
    /// Request parameters before merging.
    pub parameters: crate::action::ParameterMap,
    /// Whether the request asked for a dry run.
    pub dry_run: bool,
    /// Current status.
    pub status: ApprovalStatus,
    /// Requester credential.
    pub requested_by: String,
    /// Requester role.
    pub requester_role: String,
    /// Controller resolved at creation.
    pub controller: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Resolver credential.
    pub resolved_by: Option<String>,
    /// Resolution timestamp.
    pub resolved_at: Option<DateTime<Utc>>,
}

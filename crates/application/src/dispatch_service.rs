use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use remedy_core::{AppError, AppResult, Principal};
use remedy_domain::{
    ActionDefinition, ApprovalId, ApprovalStatus, AuditRecord, ControllerDefinition,
    ControllerType, ExecutionPlan, ExecutionRequest, ExecutionResult, ExecutionTarget,
    ParameterMap, Permission,
};

use crate::AuthorizationService;
use crate::action_registry::ActionRegistry;
use crate::dispatch_ports::{
    ActionExecutor, ApprovalQueue, AuditRecorder, DispatchNotification, NotificationChannel,
    NotificationDelivery,
};

mod approvals;
mod audit;
mod webhook;

pub use approvals::{ApprovalResolution, REJECTED_BY_APPROVER};
pub use audit::DEFAULT_AUDIT_LIMIT;

/// Default wall-clock bound for one external execution.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Outcome of one executed (or rejected) dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    /// Action name.
    pub action: String,
    /// Controller the action ran on.
    pub controller: String,
    /// Controller type.
    pub controller_type: ControllerType,
    /// Role of the actor.
    pub role: String,
    /// Merged parameters used for the run.
    pub parameters: ParameterMap,
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Execution outcome.
    pub execution: ExecutionResult,
    /// Linked approval, for approval-driven runs.
    pub approval_id: Option<ApprovalId>,
    /// Terminal approval status, for approval-driven runs.
    pub approval_status: Option<ApprovalStatus>,
}

/// Result of a webhook dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The action ran immediately.
    Executed(ExecutionReport),
    /// The request waits for an operator decision.
    PendingApproval {
        /// Identifier of the queued entry.
        approval_id: ApprovalId,
    },
}

/// Action and controller resolved for one dispatch.
#[derive(Debug, Clone)]
struct ResolvedDispatch {
    action: ActionDefinition,
    controller: ControllerDefinition,
}

/// Audit stamps for approval-driven records.
#[derive(Debug, Clone)]
struct ApprovalStamp {
    approval_id: ApprovalId,
    approval_status: ApprovalStatus,
    requested_by: String,
}

/// Orchestrates webhook dispatches, approvals and audit queries.
#[derive(Clone)]
pub struct DispatchService {
    registry: Arc<ActionRegistry>,
    authorization_service: AuthorizationService,
    executor: Arc<dyn ActionExecutor>,
    approval_queue: Arc<dyn ApprovalQueue>,
    audit_recorder: Arc<dyn AuditRecorder>,
    notification_channels: Vec<Arc<dyn NotificationChannel>>,
    execution_timeout: Duration,
}

impl DispatchService {
    /// Creates a dispatch service.
    #[must_use]
    pub fn new(
        registry: Arc<ActionRegistry>,
        authorization_service: AuthorizationService,
        executor: Arc<dyn ActionExecutor>,
        approval_queue: Arc<dyn ApprovalQueue>,
        audit_recorder: Arc<dyn AuditRecorder>,
    ) -> Self {
        Self {
            registry,
            authorization_service,
            executor,
            approval_queue,
            audit_recorder,
            notification_channels: Vec::new(),
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }

    /// Adds one notification channel invoked after every execution.
    #[must_use]
    pub fn with_notification_channel(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        self.notification_channels.push(channel);
        self
    }

    /// Overrides the wall-clock bound for external executions.
    #[must_use]
    pub fn with_execution_timeout(mut self, execution_timeout: Duration) -> Self {
        self.execution_timeout = execution_timeout;
        self
    }

    /// Returns the registry backing this service.
    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Returns whether the principal may override controllers.
    #[must_use]
    pub fn can_override_controller(&self, principal: &Principal) -> bool {
        self.authorization_service
            .has_permission(principal.role(), Permission::ControllerOverride)
    }

    fn resolve_dispatch(
        &self,
        principal: &Principal,
        request: &ExecutionRequest,
    ) -> AppResult<ResolvedDispatch> {
        let action = self
            .registry
            .resolve_action(request.event_type.as_str())
            .ok_or_else(|| AppError::Validation("unknown action/event_type".to_owned()))?;

        let controller_name = match request.controller_override() {
            Some(controller_override) => {
                if !self.can_override_controller(principal) {
                    return Err(AppError::Forbidden(format!(
                        "controller override not permitted for role '{}'",
                        principal.role()
                    )));
                }
                controller_override
            }
            None => action.default_controller(),
        };

        let controller = self
            .registry
            .resolve_controller(controller_name)
            .ok_or_else(|| AppError::Validation("unknown controller".to_owned()))?;

        Ok(ResolvedDispatch {
            action: action.clone(),
            controller: controller.clone(),
        })
    }

    fn resolve_stored_dispatch(
        &self,
        request: &ExecutionRequest,
        controller_name: &str,
    ) -> AppResult<ResolvedDispatch> {
        let action = self
            .registry
            .resolve_action(request.event_type.as_str())
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "approved action '{}' is no longer registered",
                    request.event_type
                ))
            })?;
        let controller = self
            .registry
            .resolve_controller(controller_name)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "approved controller '{controller_name}' is no longer registered"
                ))
            })?;

        Ok(ResolvedDispatch {
            action: action.clone(),
            controller: controller.clone(),
        })
    }

    async fn execute_resolved(
        &self,
        resolved: &ResolvedDispatch,
        parameters: &ParameterMap,
        dry_run: bool,
    ) -> ExecutionResult {
        let plan = ExecutionPlan {
            target: ExecutionTarget::resolve(
                resolved.action.kind(),
                resolved.controller.name(),
                resolved.controller.controller_type(),
            ),
            parameters: parameters.clone(),
            dry_run,
            timeout: self.execution_timeout,
        };

        tracing::info!(
            action = resolved.action.name(),
            controller = resolved.controller.name(),
            target = plan.target.kind_name(),
            reference = plan.target.reference(),
            dry_run,
            "executing action"
        );

        let result = self.executor.execute(plan).await;
        if result.success() {
            tracing::info!(
                action = resolved.action.name(),
                exit_code = result.exit_code(),
                "action finished"
            );
        } else {
            tracing::warn!(
                action = resolved.action.name(),
                exit_code = result.exit_code(),
                error = result.error().unwrap_or_default(),
                "action failed"
            );
        }

        result
    }

    fn audit_record(
        actor: &Principal,
        resolved: &ResolvedDispatch,
        parameters: ParameterMap,
        dry_run: bool,
        execution: ExecutionResult,
        stamp: Option<ApprovalStamp>,
    ) -> AuditRecord {
        let (approval_id, approval_status, requested_by) = match stamp {
            Some(stamp) => (
                Some(stamp.approval_id),
                Some(stamp.approval_status),
                Some(stamp.requested_by),
            ),
            None => (None, None, None),
        };

        AuditRecord {
            timestamp: Utc::now(),
            user: actor.credential().to_owned(),
            role: actor.role().to_owned(),
            action: resolved.action.name().to_owned(),
            controller: resolved.controller.name().to_owned(),
            controller_type: resolved.controller.controller_type(),
            parameters,
            status: execution.success(),
            execution,
            client_ip: actor.client_origin().map(str::to_owned),
            dry_run,
            approval_id,
            approval_status,
            requested_by,
        }
    }

    fn report_from_record(record: AuditRecord) -> ExecutionReport {
        ExecutionReport {
            action: record.action,
            controller: record.controller,
            controller_type: record.controller_type,
            role: record.role,
            parameters: record.parameters,
            dry_run: record.dry_run,
            execution: record.execution,
            approval_id: record.approval_id,
            approval_status: record.approval_status,
        }
    }

    async fn append_audit(&self, record: &AuditRecord) -> AppResult<()> {
        self.audit_recorder.append(record.clone()).await.map_err(|error| {
            tracing::error!(action = record.action.as_str(), error = %error, "audit append failed");
            error
        })
    }

    async fn notify(&self, notification: DispatchNotification) {
        for channel in &self.notification_channels {
            match channel.send(&notification).await {
                Ok(NotificationDelivery::Delivered) => tracing::debug!(
                    channel = channel.channel_name(),
                    action = notification.action.as_str(),
                    "notification delivered"
                ),
                Ok(NotificationDelivery::Skipped) => tracing::debug!(
                    channel = channel.channel_name(),
                    action = notification.action.as_str(),
                    "notification skipped"
                ),
                Err(error) => tracing::warn!(
                    channel = channel.channel_name(),
                    action = notification.action.as_str(),
                    error = %error,
                    "notification failed"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests;

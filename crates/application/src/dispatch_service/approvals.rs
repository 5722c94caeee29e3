use remedy_domain::{ApprovalDecision, ApprovalEntry, ApprovalSummary};

use crate::dispatch_ports::DispatchNotification;

use super::*;

/// Error text stored on entries an operator rejected.
pub const REJECTED_BY_APPROVER: &str = "rejected by approver";

/// Entry state after a decision together with the resulting report.
#[derive(Debug, Clone)]
pub struct ApprovalResolution {
    /// Entry after the stored result was attached.
    pub entry: ApprovalEntry,
    /// Audited outcome.
    pub report: ExecutionReport,
}

impl DispatchService {
    /// Lists queued entries without their results.
    pub async fn list_approvals(&self) -> AppResult<Vec<ApprovalSummary>> {
        self.approval_queue.list().await
    }

    /// Returns one entry by identifier.
    pub async fn get_approval(&self, approval_id: &str) -> AppResult<ApprovalEntry> {
        let id = ApprovalId::parse(approval_id)?;
        self.approval_queue
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("approval '{id}' does not exist")))
    }

    /// Approves a pending entry and executes its stored request.
    pub async fn approve(
        &self,
        approver: &Principal,
        approval_id: &str,
    ) -> AppResult<ApprovalResolution> {
        let id = ApprovalId::parse(approval_id)?;
        let entry = self
            .approval_queue
            .resolve(id, ApprovalDecision::Approve, approver.credential())
            .await?;
        tracing::info!(
            approval_id = %id,
            approver = approver.credential(),
            requester_role = entry.requester_role(),
            "approval granted"
        );

        let resolved = match self.resolve_stored_dispatch(entry.request(), entry.controller()) {
            Ok(resolved) => resolved,
            Err(error) => {
                self.approval_queue
                    .store_result(id, ExecutionResult::not_executed(error.to_string()))
                    .await?;
                return Err(error);
            }
        };

        let parameters = resolved
            .action
            .merge_parameters(&entry.request().parameters);
        let dry_run = entry.request().dry_run;
        let execution = self.execute_resolved(&resolved, &parameters, dry_run).await;

        let entry = self.approval_queue.store_result(id, execution.clone()).await?;
        let record = Self::audit_record(
            approver,
            &resolved,
            parameters,
            dry_run,
            execution,
            Some(ApprovalStamp {
                approval_id: id,
                approval_status: ApprovalStatus::Approved,
                requested_by: entry.requested_by().to_owned(),
            }),
        );
        self.append_audit(&record).await?;

        self.notify(DispatchNotification::from_result(
            record.action.as_str(),
            record.controller.as_str(),
            record.user.as_str(),
            &record.execution,
        ))
        .await;

        Ok(ApprovalResolution {
            entry,
            report: Self::report_from_record(record),
        })
    }

    /// Rejects a pending entry without executing it.
    pub async fn reject(
        &self,
        approver: &Principal,
        approval_id: &str,
    ) -> AppResult<ApprovalResolution> {
        let id = ApprovalId::parse(approval_id)?;
        self.approval_queue
            .resolve(id, ApprovalDecision::Reject, approver.credential())
            .await?;

        let execution = ExecutionResult::not_executed(REJECTED_BY_APPROVER);
        let entry = self.approval_queue.store_result(id, execution.clone()).await?;
        tracing::info!(
            approval_id = %id,
            approver = approver.credential(),
            requester_role = entry.requester_role(),
            "approval rejected"
        );

        let resolved = self.resolve_stored_dispatch(entry.request(), entry.controller())?;
        let parameters = resolved
            .action
            .merge_parameters(&entry.request().parameters);
        let record = Self::audit_record(
            approver,
            &resolved,
            parameters,
            entry.request().dry_run,
            execution,
            Some(ApprovalStamp {
                approval_id: id,
                approval_status: ApprovalStatus::Rejected,
                requested_by: entry.requested_by().to_owned(),
            }),
        );
        self.append_audit(&record).await?;

        Ok(ApprovalResolution {
            entry,
            report: Self::report_from_record(record),
        })
    }
}

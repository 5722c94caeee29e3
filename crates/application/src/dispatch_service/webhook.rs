use remedy_domain::ApprovalEntry;
use serde_json::Value;

use crate::dispatch_ports::DispatchNotification;

use super::*;

impl DispatchService {
    /// Parses a raw webhook body into a validated execution request.
    pub fn parse_request(body: &[u8]) -> AppResult<ExecutionRequest> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| AppError::Validation("malformed JSON payload".to_owned()))?;

        let request: ExecutionRequest = serde_json::from_value(value)
            .map_err(|error| AppError::Validation(format!("invalid payload: {error}")))?;
        request.validate()?;

        Ok(request)
    }

    /// Handles one raw webhook body on behalf of the principal.
    pub async fn dispatch_webhook(
        &self,
        principal: &Principal,
        body: &[u8],
    ) -> AppResult<DispatchOutcome> {
        let request = Self::parse_request(body)?;
        self.dispatch(principal, request).await
    }

    /// Resolves, authorizes and either executes or queues one request.
    pub async fn dispatch(
        &self,
        principal: &Principal,
        request: ExecutionRequest,
    ) -> AppResult<DispatchOutcome> {
        request.validate()?;
        let resolved = self.resolve_dispatch(principal, &request)?;

        if request.approval_required {
            let entry = ApprovalEntry::pending(
                request,
                principal.credential(),
                principal.role(),
                resolved.controller.name(),
            );
            let approval_id = self.approval_queue.enqueue(entry).await?;
            tracing::info!(
                approval_id = %approval_id,
                action = resolved.action.name(),
                controller = resolved.controller.name(),
                "dispatch queued for approval"
            );

            return Ok(DispatchOutcome::PendingApproval { approval_id });
        }

        let parameters = resolved.action.merge_parameters(&request.parameters);
        let execution = self
            .execute_resolved(&resolved, &parameters, request.dry_run)
            .await;

        let record = Self::audit_record(
            principal,
            &resolved,
            parameters,
            request.dry_run,
            execution,
            None,
        );
        self.append_audit(&record).await?;

        self.notify(DispatchNotification::from_result(
            record.action.as_str(),
            record.controller.as_str(),
            record.user.as_str(),
            &record.execution,
        ))
        .await;

        Ok(DispatchOutcome::Executed(Self::report_from_record(record)))
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use remedy_core::{AppError, AppResult, Principal};
use remedy_domain::{
    ActionDefinition, ActionKind, ApprovalDecision, ApprovalEntry, ApprovalId, ApprovalStatus,
    ApprovalSummary, AuditFilter, AuditRecord, ControllerDefinition, ControllerType,
    ExecutionPlan, ExecutionResult, ExecutionTarget, ParameterMap, PermissionEntry,
    RoleDefinition,
};

use crate::action_registry::ActionRegistry;
use crate::dispatch_ports::{
    ActionExecutor, ApprovalQueue, AuditRecorder, DispatchNotification, NotificationChannel,
    NotificationDelivery, NotificationStatus,
};
use crate::AuthorizationService;

use super::{DispatchOutcome, DispatchService, REJECTED_BY_APPROVER};

#[derive(Default)]
struct SpyExecutor {
    calls: AtomicUsize,
    plans: Mutex<Vec<ExecutionPlan>>,
}

#[async_trait]
impl ActionExecutor for SpyExecutor {
    async fn execute(&self, plan: ExecutionPlan) -> ExecutionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let result = if plan.dry_run {
            ExecutionResult::dry_run(plan.describe())
        } else {
            ExecutionResult::completed(0, format!("ran {}", plan.target.reference()), String::new())
        };
        self.plans.lock().await.push(plan);
        result
    }
}

#[derive(Default)]
struct FakeApprovalQueue {
    entries: Mutex<Vec<ApprovalEntry>>,
}

#[async_trait]
impl ApprovalQueue for FakeApprovalQueue {
    async fn enqueue(&self, entry: ApprovalEntry) -> AppResult<ApprovalId> {
        let id = entry.id();
        self.entries.lock().await.push(entry);
        Ok(id)
    }

    async fn get(&self, id: ApprovalId) -> AppResult<Option<ApprovalEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .find(|entry| entry.id() == id)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<ApprovalSummary>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .map(ApprovalEntry::summary)
            .collect())
    }

    async fn resolve(
        &self,
        id: ApprovalId,
        decision: ApprovalDecision,
        resolved_by: &str,
    ) -> AppResult<ApprovalEntry> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("approval '{id}' does not exist")))?;
        entry.resolve(decision, resolved_by)?;
        Ok(entry.clone())
    }

    async fn store_result(
        &self,
        id: ApprovalId,
        result: ExecutionResult,
    ) -> AppResult<ApprovalEntry> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("approval '{id}' does not exist")))?;
        entry.attach_result(result)?;
        Ok(entry.clone())
    }
}

#[derive(Default)]
struct FakeAuditRecorder {
    records: Mutex<Vec<AuditRecord>>,
}

#[async_trait]
impl AuditRecorder for FakeAuditRecorder {
    async fn append(&self, record: AuditRecord) -> AppResult<()> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn query(&self, filter: &AuditFilter, limit: usize) -> AppResult<Vec<AuditRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .rev()
            .filter(|record| filter.matches(record))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeNotificationChannel {
    sent: Mutex<Vec<DispatchNotification>>,
    failing: bool,
}

#[async_trait]
impl NotificationChannel for FakeNotificationChannel {
    fn channel_name(&self) -> &'static str {
        "fake"
    }

    async fn send(&self, notification: &DispatchNotification) -> AppResult<NotificationDelivery> {
        self.sent.lock().await.push(notification.clone());
        if self.failing {
            return Err(AppError::Internal("webhook unreachable".to_owned()));
        }

        Ok(NotificationDelivery::Delivered)
    }
}

struct Harness {
    service: DispatchService,
    executor: Arc<SpyExecutor>,
    queue: Arc<FakeApprovalQueue>,
    audit: Arc<FakeAuditRecorder>,
    channel: Arc<FakeNotificationChannel>,
}

fn registry() -> ActionRegistry {
    let mut static_parameters = ParameterMap::new();
    static_parameters.insert("service_name".to_owned(), json!("httpd"));
    static_parameters.insert("retries".to_owned(), json!(3));

    let actions = vec![
        ActionDefinition::new(
            "restart_service",
            ActionKind::Playbook {
                reference: "playbooks/restart_service.yml".to_owned(),
            },
            "ansible_local",
            static_parameters,
        )
        .unwrap_or_else(|_| unreachable!()),
        ActionDefinition::new(
            "cleanup_disk",
            ActionKind::Script {
                reference: "scripts/cleanup_disk.sh".to_owned(),
            },
            "local",
            ParameterMap::new(),
        )
        .unwrap_or_else(|_| unreachable!()),
    ];
    let controllers = vec![
        ControllerDefinition::new("ansible_local", ControllerType::Ansible, json!({}))
            .unwrap_or_else(|_| unreachable!()),
        ControllerDefinition::new("local", ControllerType::Local, json!({}))
            .unwrap_or_else(|_| unreachable!()),
        ControllerDefinition::new("dc1-ansible", ControllerType::Ansible, json!({}))
            .unwrap_or_else(|_| unreachable!()),
        ControllerDefinition::new("edge-remote", ControllerType::Remote, json!({}))
            .unwrap_or_else(|_| unreachable!()),
    ];

    ActionRegistry::build(Vec::new(), actions, controllers)
        .unwrap_or_else(|_| unreachable!())
        .registry
}

fn authorization_service() -> AuthorizationService {
    let api_keys = [
        ("admin-key", "admin"),
        ("operator-key", "operator"),
        ("readonly-key", "readonly"),
    ]
    .into_iter()
    .map(|(key, role)| (key.to_owned(), role.to_owned()))
    .collect();
    let roles = vec![
        RoleDefinition::new(
            "admin",
            vec![PermissionEntry::Granted("controller_override".to_owned())],
        )
        .unwrap_or_else(|_| unreachable!()),
        RoleDefinition::new("operator", Vec::new()).unwrap_or_else(|_| unreachable!()),
        RoleDefinition::new("readonly", Vec::new()).unwrap_or_else(|_| unreachable!()),
    ];

    AuthorizationService::new(api_keys, roles).unwrap_or_else(|_| unreachable!())
}

fn harness_with_channel(channel: FakeNotificationChannel) -> Harness {
    let executor = Arc::new(SpyExecutor::default());
    let queue = Arc::new(FakeApprovalQueue::default());
    let audit = Arc::new(FakeAuditRecorder::default());
    let channel = Arc::new(channel);

    let service = DispatchService::new(
        Arc::new(registry()),
        authorization_service(),
        executor.clone(),
        queue.clone(),
        audit.clone(),
    )
    .with_notification_channel(channel.clone());

    Harness {
        service,
        executor,
        queue,
        audit,
        channel,
    }
}

fn harness() -> Harness {
    harness_with_channel(FakeNotificationChannel::default())
}

fn admin() -> Principal {
    Principal::new("admin-key", "admin").with_client_origin(Some("10.0.0.7".to_owned()))
}

fn operator() -> Principal {
    Principal::new("operator-key", "operator")
}

async fn queue_restart(harness: &Harness) -> ApprovalId {
    let outcome = harness
        .service
        .dispatch_webhook(
            &operator(),
            br#"{"event_type":"restart_service","parameters":{"service_name":"nginx"},"approval_required":true}"#,
        )
        .await;

    match outcome {
        Ok(DispatchOutcome::PendingApproval { approval_id }) => approval_id,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn webhook_executes_action_on_default_controller() {
    let harness = harness();

    let outcome = harness
        .service
        .dispatch_webhook(
            &admin(),
            br#"{"event_type":"restart_service","parameters":{"service_name":"nginx"}}"#,
        )
        .await;

    let report = match outcome {
        Ok(DispatchOutcome::Executed(report)) => report,
        _ => unreachable!(),
    };
    assert_eq!(report.action, "restart_service");
    assert_eq!(report.controller, "ansible_local");
    assert_eq!(report.controller_type, ControllerType::Ansible);
    assert_eq!(report.role, "admin");
    assert!(report.execution.success());

    let records = harness.audit.records.lock().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].status);
    assert_eq!(records[0].user, "admin-key");
    assert_eq!(records[0].client_ip.as_deref(), Some("10.0.0.7"));
    assert_eq!(records[0].approval_id, None);

    let sent = harness.channel.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].status, NotificationStatus::Success);
    assert_eq!(sent[0].details.as_deref(), Some("ran playbooks/restart_service.yml"));
}

#[tokio::test]
async fn request_parameters_override_static_parameters() {
    let harness = harness();

    let outcome = harness
        .service
        .dispatch_webhook(
            &admin(),
            br#"{"event_type":"restart_service","parameters":{"service_name":"nginx","force":true}}"#,
        )
        .await;
    assert!(outcome.is_ok());

    let plans = harness.executor.plans.lock().await;
    let parameters = &plans[0].parameters;
    assert_eq!(parameters.get("service_name"), Some(&json!("nginx")));
    assert_eq!(parameters.get("retries"), Some(&json!(3)));
    assert_eq!(parameters.get("force"), Some(&json!(true)));
    assert_eq!(
        parameters.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["service_name", "retries", "force"]
    );
}

#[tokio::test]
async fn malformed_and_invalid_payloads_are_rejected() {
    let harness = harness();

    let malformed = harness.service.dispatch_webhook(&admin(), b"{not json").await;
    assert!(matches!(
        malformed,
        Err(AppError::Validation(ref message)) if message == "malformed JSON payload"
    ));

    let missing_event = harness
        .service
        .dispatch_webhook(&admin(), br#"{"parameters":{}}"#)
        .await;
    assert!(matches!(
        missing_event,
        Err(AppError::Validation(ref message)) if message.starts_with("invalid payload")
    ));

    let blank_event = harness
        .service
        .dispatch_webhook(&admin(), br#"{"event_type":"   "}"#)
        .await;
    assert!(matches!(
        blank_event,
        Err(AppError::Validation(ref message)) if message.starts_with("invalid payload")
    ));

    assert!(harness.audit.records.lock().await.is_empty());
    assert_eq!(harness.executor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_action_writes_no_audit_record() {
    let harness = harness();

    let outcome = harness
        .service
        .dispatch_webhook(&admin(), br#"{"event_type":"reboot_planet"}"#)
        .await;

    assert!(matches!(
        outcome,
        Err(AppError::Validation(ref message)) if message == "unknown action/event_type"
    ));
    assert!(harness.audit.records.lock().await.is_empty());
}

#[tokio::test]
async fn override_without_permission_never_executes() {
    let harness = harness();

    let outcome = harness
        .service
        .dispatch_webhook(
            &operator(),
            br#"{"event_type":"restart_service","controller_override":"dc1-ansible"}"#,
        )
        .await;

    assert!(matches!(
        outcome,
        Err(AppError::Forbidden(ref message))
            if message == "controller override not permitted for role 'operator'"
    ));
    assert_eq!(harness.executor.calls.load(Ordering::SeqCst), 0);
    assert!(harness.audit.records.lock().await.is_empty());
}

#[tokio::test]
async fn admin_override_selects_controller_and_unknown_is_rejected() {
    let harness = harness();

    let outcome = harness
        .service
        .dispatch_webhook(
            &admin(),
            br#"{"event_type":"restart_service","controller_override":"dc1-ansible"}"#,
        )
        .await;
    assert!(matches!(
        outcome,
        Ok(DispatchOutcome::Executed(ref report)) if report.controller == "dc1-ansible"
    ));

    let unknown = harness
        .service
        .dispatch_webhook(
            &admin(),
            br#"{"event_type":"restart_service","controller_override":"dc7-ansible"}"#,
        )
        .await;
    assert!(matches!(
        unknown,
        Err(AppError::Validation(ref message)) if message == "unknown controller"
    ));
    assert_eq!(harness.audit.records.lock().await.len(), 1);
}

#[tokio::test]
async fn remote_controller_produces_remote_target() {
    let harness = harness();

    let outcome = harness
        .service
        .dispatch_webhook(
            &admin(),
            br#"{"event_type":"cleanup_disk","controller_override":"edge-remote"}"#,
        )
        .await;
    assert!(outcome.is_ok());

    let plans = harness.executor.plans.lock().await;
    assert!(matches!(
        plans[0].target,
        ExecutionTarget::Remote { ref controller, .. } if controller == "edge-remote"
    ));
}

#[tokio::test]
async fn dry_run_is_forwarded_and_audited() {
    let harness = harness();

    let outcome = harness
        .service
        .dispatch_webhook(
            &admin(),
            br#"{"event_type":"cleanup_disk","parameters":{"path":"/var/tmp"},"dry_run":true}"#,
        )
        .await;

    let report = match outcome {
        Ok(DispatchOutcome::Executed(report)) => report,
        _ => unreachable!(),
    };
    assert!(report.dry_run);
    assert!(report.execution.stdout().starts_with("[DRY-RUN]"));
    assert!(harness.audit.records.lock().await[0].dry_run);
}

#[tokio::test]
async fn approval_required_queues_without_side_effects() {
    let harness = harness();

    let approval_id = queue_restart(&harness).await;

    assert_eq!(harness.executor.calls.load(Ordering::SeqCst), 0);
    assert!(harness.audit.records.lock().await.is_empty());
    assert!(harness.channel.sent.lock().await.is_empty());

    let approvals = harness.service.list_approvals().await;
    assert!(matches!(
        approvals,
        Ok(ref approvals) if approvals.len() == 1
            && approvals[0].id == approval_id
            && approvals[0].status == ApprovalStatus::Pending
            && approvals[0].controller == "ansible_local"
    ));
}

#[tokio::test]
async fn approve_executes_stored_request_once() {
    let harness = harness();
    let approval_id = queue_restart(&harness).await;

    let resolution = harness
        .service
        .approve(&admin(), &approval_id.to_string())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(resolution.entry.status(), ApprovalStatus::Approved);
    assert_eq!(resolution.entry.requester_role(), "operator");
    assert!(resolution.entry.result().is_some_and(ExecutionResult::success));
    assert_eq!(resolution.report.approval_id, Some(approval_id));
    assert_eq!(harness.executor.calls.load(Ordering::SeqCst), 1);

    {
        let records = harness.audit.records.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user, "admin-key");
        assert_eq!(records[0].requested_by.as_deref(), Some("operator-key"));
        assert_eq!(records[0].approval_status, Some(ApprovalStatus::Approved));
        assert_eq!(records[0].parameters.get("service_name"), Some(&json!("nginx")));
    }
    assert_eq!(harness.channel.sent.lock().await.len(), 1);

    let second = harness.service.approve(&admin(), &approval_id.to_string()).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let rejected_late = harness.service.reject(&admin(), &approval_id.to_string()).await;
    assert!(matches!(rejected_late, Err(AppError::Conflict(_))));

    assert_eq!(harness.executor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.audit.records.lock().await.len(), 1);

    let stored = harness
        .service
        .get_approval(&approval_id.to_string())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored.status(), ApprovalStatus::Approved);
    assert_eq!(stored.resolved_by(), Some("admin-key"));
}

#[tokio::test]
async fn reject_records_without_executing_or_notifying() {
    let harness = harness();
    let approval_id = queue_restart(&harness).await;

    let resolution = harness
        .service
        .reject(&admin(), &approval_id.to_string())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(resolution.entry.status(), ApprovalStatus::Rejected);
    assert_eq!(resolution.entry.requester_role(), "operator");
    assert_eq!(
        resolution.entry.result().and_then(ExecutionResult::error),
        Some(REJECTED_BY_APPROVER)
    );
    assert_eq!(harness.executor.calls.load(Ordering::SeqCst), 0);
    assert!(harness.channel.sent.lock().await.is_empty());

    let records = harness.audit.records.lock().await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].status);
    assert_eq!(records[0].approval_status, Some(ApprovalStatus::Rejected));
}

#[tokio::test]
async fn unknown_approval_is_not_found() {
    let harness = harness();

    let unknown = harness
        .service
        .approve(&admin(), &ApprovalId::new().to_string())
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let garbage = harness.service.get_approval("not-a-uuid").await;
    assert!(matches!(garbage, Err(AppError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_approvals_execute_exactly_once() {
    let harness = harness();
    let approval_id = queue_restart(&harness).await;

    let mut tasks = JoinSet::new();
    for _ in 0..8 {
        let service = harness.service.clone();
        let id = approval_id.to_string();
        tasks.spawn(async move { service.approve(&admin(), &id).await.is_ok() });
    }

    let mut successes = 0;
    while let Some(joined) = tasks.join_next().await {
        if joined.unwrap_or_else(|_| unreachable!()) {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(harness.executor.calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.audit.records.lock().await.len(), 1);
    assert_eq!(harness.queue.entries.lock().await.len(), 1);
}

#[tokio::test]
async fn notification_failure_does_not_fail_dispatch() {
    let harness = harness_with_channel(FakeNotificationChannel {
        failing: true,
        ..FakeNotificationChannel::default()
    });

    let outcome = harness
        .service
        .dispatch_webhook(&admin(), br#"{"event_type":"cleanup_disk"}"#)
        .await;

    assert!(matches!(outcome, Ok(DispatchOutcome::Executed(_))));
    assert_eq!(harness.channel.sent.lock().await.len(), 1);
    assert_eq!(harness.audit.records.lock().await.len(), 1);
}

#[tokio::test]
async fn audit_query_filters_and_validates_range() {
    let harness = harness();
    for body in [
        br#"{"event_type":"cleanup_disk"}"#.as_slice(),
        br#"{"event_type":"restart_service"}"#.as_slice(),
        br#"{"event_type":"cleanup_disk"}"#.as_slice(),
    ] {
        assert!(harness.service.dispatch_webhook(&admin(), body).await.is_ok());
    }

    let filter = AuditFilter {
        action: Some("cleanup_disk".to_owned()),
        ..AuditFilter::default()
    };
    let records = harness.service.query_audit(&filter, Some(1)).await;
    assert!(matches!(records, Ok(ref records) if records.len() == 1));

    let all = harness.service.query_audit(&AuditFilter::default(), None).await;
    assert!(matches!(all, Ok(ref records) if records.len() == 3 && records[0].action == "cleanup_disk"));

    let now = chrono::Utc::now();
    let inverted = AuditFilter {
        start: Some(now),
        end: Some(now - chrono::Duration::hours(1)),
        ..AuditFilter::default()
    };
    assert!(matches!(
        harness.service.query_audit(&inverted, None).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn override_capability_follows_role() {
    let harness = harness();

    assert!(harness.service.can_override_controller(&admin()));
    assert!(!harness.service.can_override_controller(&operator()));
}

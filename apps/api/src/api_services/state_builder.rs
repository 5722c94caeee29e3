use std::sync::Arc;

use remedy_application::DispatchService;
use remedy_core::AppError;
use remedy_infrastructure::{
    InMemoryApprovalQueue, JsonLinesAuditLog, ProcessActionExecutor, load_config_dir,
};
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod notifications;
mod registry;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let dispatcher_config = load_config_dir(&config.config_dir).await?;
    let registry = registry::build_action_registry(config, &dispatcher_config).await?;
    let authorization_service = registry::build_authorization_service(&dispatcher_config)?;

    let audit_log = Arc::new(JsonLinesAuditLog::new(&config.audit_log_path));
    if let Err(error) = audit_log.ensure_writable().await {
        tracing::warn!(error = %error, "audit log is not writable at startup");
    }

    let executor = Arc::new(ProcessActionExecutor::new(
        config.playbook_runner.as_str(),
        ".",
    ));

    let mut dispatch_service = DispatchService::new(
        Arc::new(registry),
        authorization_service.clone(),
        executor,
        Arc::new(InMemoryApprovalQueue::new()),
        audit_log.clone(),
    )
    .with_execution_timeout(config.action_timeout);

    for channel in notifications::build_notification_channels(&dispatcher_config.notifications)? {
        info!(channel = channel.channel_name(), "notification channel configured");
        dispatch_service = dispatch_service.with_notification_channel(channel);
    }

    Ok(AppState {
        dispatch_service,
        authorization_service,
        audit_log,
        api_version: config.api_version.clone(),
    })
}

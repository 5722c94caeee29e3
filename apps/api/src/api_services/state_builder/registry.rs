use remedy_application::{ActionRegistry, AuthorizationService};
use remedy_core::AppError;
use remedy_infrastructure::{DispatcherConfig, FilesystemActionDiscovery};
use tracing::{info, warn};

use crate::api_config::ApiConfig;

pub(super) async fn build_action_registry(
    config: &ApiConfig,
    dispatcher_config: &DispatcherConfig,
) -> Result<ActionRegistry, AppError> {
    let discovered = FilesystemActionDiscovery::new(&config.playbooks_dir, &config.scripts_dir)
        .discover()
        .await?;

    let build = ActionRegistry::build(
        discovered,
        dispatcher_config.actions.clone(),
        dispatcher_config.controllers.clone(),
    )?;
    for warning in &build.warnings {
        warn!(warning = %warning, "action registry warning");
    }

    let registry = build.registry;
    info!(
        actions = registry.action_names().len(),
        controllers = registry.controller_names().len(),
        "action registry built"
    );
    if registry.is_empty() {
        warn!("action registry is empty; readiness checks will fail");
    }

    Ok(registry)
}

pub(super) fn build_authorization_service(
    dispatcher_config: &DispatcherConfig,
) -> Result<AuthorizationService, AppError> {
    let authorization_service = AuthorizationService::new(
        dispatcher_config.api_keys.clone(),
        dispatcher_config.roles.clone(),
    )?;

    for role in authorization_service.undefined_roles() {
        warn!(role, "api key references a role without definition");
    }

    Ok(authorization_service)
}

use remedy_application::ActionRegistry;
use remedy_infrastructure::JsonLinesAuditLog;

use super::*;

pub(super) async fn check_audit_log(audit_log: &JsonLinesAuditLog) -> DependencyStatus {
    match audit_log.ensure_writable().await {
        Ok(()) => DependencyStatus::ok(),
        Err(error) => DependencyStatus::error(format!(
            "audit log '{}' is not writable: {error}",
            audit_log.path().display()
        )),
    }
}

pub(super) fn check_registry(registry: &ActionRegistry) -> DependencyStatus {
    if registry.is_empty() {
        DependencyStatus::error("no actions are registered".to_owned())
    } else {
        DependencyStatus::ok()
    }
}

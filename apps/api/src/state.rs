use std::sync::Arc;

use remedy_application::{AuthorizationService, DispatchService};
use remedy_infrastructure::JsonLinesAuditLog;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatch_service: DispatchService,
    pub authorization_service: AuthorizationService,
    pub audit_log: Arc<JsonLinesAuditLog>,
    pub api_version: String,
}

use super::checks::{check_audit_log, check_registry};
use super::*;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.api_version,
    })
}

pub async fn live_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "live",
        version: state.api_version,
    })
}

pub async fn ready_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let audit_log = check_audit_log(&state.audit_log).await;
    let registry = check_registry(state.dispatch_service.registry());

    let ready = audit_log.is_ok() && registry.is_ok();
    if !ready {
        tracing::warn!(
            audit_log = audit_log.status,
            registry = registry.status,
            "readiness check failed"
        );
    }

    let (http_status, status) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        http_status,
        Json(ReadinessResponse {
            status,
            version: state.api_version,
            checks: ReadinessChecks {
                audit_log,
                registry,
            },
        }),
    )
}

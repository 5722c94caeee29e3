use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use remedy_core::Principal;

use crate::dto::{GenericMessageResponse, OverrideCapabilityResponse};
use crate::state::AppState;

pub async fn protected_handler(
    Extension(principal): Extension<Principal>,
) -> Json<GenericMessageResponse> {
    tracing::debug!(role = principal.role(), "protected endpoint accessed");
    Json(GenericMessageResponse {
        message: "You have accessed a protected endpoint!".to_owned(),
    })
}

pub async fn can_override_controller_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> (StatusCode, Json<OverrideCapabilityResponse>) {
    let allowed = state.dispatch_service.can_override_controller(&principal);
    let status = if allowed {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };

    (
        status,
        Json(OverrideCapabilityResponse {
            allowed,
            role: principal.role().to_owned(),
            detail: (!allowed).then_some("Forbidden"),
        }),
    )
}

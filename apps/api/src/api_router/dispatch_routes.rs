use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_dispatch_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/protected", get(handlers::access::protected_handler))
        .route(
            "/can-override-controller",
            get(handlers::access::can_override_controller_handler),
        )
        .route("/webhook", post(handlers::webhook::webhook_handler))
        .route(
            "/approvals",
            get(handlers::approvals::list_approvals_handler),
        )
        .route(
            "/approvals/{approval_id}",
            get(handlers::approvals::get_approval_handler),
        )
        .route(
            "/approvals/{approval_id}/approve",
            post(handlers::approvals::approve_handler),
        )
        .route(
            "/approvals/{approval_id}/reject",
            post(handlers::approvals::reject_handler),
        )
        .route("/audit", get(handlers::audit::audit_handler))
        .route_layer(from_fn_with_state(app_state, middleware::require_api_key))
}

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod dispatch_routes;


pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = dispatch_routes::build_dispatch_routes(app_state.clone());

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/live", get(handlers::health::live_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

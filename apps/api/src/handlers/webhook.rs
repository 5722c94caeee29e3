use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use remedy_core::Principal;

use crate::dto::WebhookResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn webhook_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    let outcome = state
        .dispatch_service
        .dispatch_webhook(&principal, &body)
        .await?;

    Ok(Json(outcome.into()))
}

use axum::extract::{Path, State};
use axum::{Extension, Json};
use remedy_core::Principal;

use crate::dto::{ApprovalDetailResponse, ApprovalSummaryResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_approvals_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ApprovalSummaryResponse>>> {
    let approvals = state.dispatch_service.list_approvals().await?;

    Ok(Json(approvals.into_iter().map(Into::into).collect()))
}

pub async fn get_approval_handler(
    State(state): State<AppState>,
    Path(approval_id): Path<String>,
) -> ApiResult<Json<ApprovalDetailResponse>> {
    let entry = state.dispatch_service.get_approval(&approval_id).await?;

    Ok(Json(entry.into()))
}

pub async fn approve_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(approval_id): Path<String>,
) -> ApiResult<Json<ApprovalDetailResponse>> {
    let resolution = state
        .dispatch_service
        .approve(&principal, &approval_id)
        .await?;

    Ok(Json(resolution.entry.into()))
}

pub async fn reject_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(approval_id): Path<String>,
) -> ApiResult<Json<ApprovalDetailResponse>> {
    let resolution = state
        .dispatch_service
        .reject(&principal, &approval_id)
        .await?;

    Ok(Json(resolution.entry.into()))
}

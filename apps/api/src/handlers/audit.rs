use axum::Json;
use axum::extract::{Query, State};
use remedy_domain::AuditRecord;

use crate::dto::AuditQuery;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn audit_handler(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<Vec<AuditRecord>>> {
    let (filter, limit) = query.into_filter()?;
    let records = state.dispatch_service.query_audit(&filter, limit).await?;

    Ok(Json(records))
}

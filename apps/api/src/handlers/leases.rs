use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;

use crate::dto::LeaseResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn renew_lease_handler(
    State(state): State<AppState>,
    Path(lease_id): Path<String>,
) -> ApiResult<Json<LeaseResponse>> {
    let record = state.lease_ledger.renew(&lease_id, Utc::now()).await?;
    Ok(Json(LeaseResponse::from(record)))
}

pub async fn revoke_lease_handler(
    State(state): State<AppState>,
    Path(lease_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.lease_ledger.revoke(&lease_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

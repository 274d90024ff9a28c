use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use broker_core::AppError;

use crate::dto::{ConfigRequest, ConfigResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn write_config_handler(
    State(state): State<AppState>,
    Json(payload): Json<ConfigRequest>,
) -> ApiResult<Json<ConfigResponse>> {
    let config = state.config_store.write(payload.into()).await?;
    Ok(Json(ConfigResponse::from(config)))
}

pub async fn read_config_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ConfigResponse>> {
    let config = state
        .config_store
        .read()
        .await?
        .ok_or_else(|| AppError::NotFound("config is not set".to_owned()))?;

    Ok(Json(ConfigResponse::from(config)))
}

pub async fn delete_config_handler(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.config_store.delete().await?;
    Ok(StatusCode::NO_CONTENT)
}

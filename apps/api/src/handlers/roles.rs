use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use broker_application::WriteMode;
use broker_core::AppError;
use broker_domain::RoleName;

use crate::dto::{RoleListResponse, RoleRequest, RoleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(State(state): State<AppState>) -> ApiResult<Json<RoleListResponse>> {
    let keys = state.role_store.list().await?;
    Ok(Json(RoleListResponse { keys }))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<RoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let name = RoleName::new(name)?;
    let role = state
        .role_store
        .write(&name, WriteMode::Create, payload.into_update()?)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::new(&name, &role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<RoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let name = RoleName::new(name)?;
    let role = state
        .role_store
        .write(&name, WriteMode::Update, payload.into_update()?)
        .await?;

    Ok(Json(RoleResponse::new(&name, &role)))
}

pub async fn read_role_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let name = RoleName::new(name)?;
    let role = state
        .role_store
        .read(&name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{name}' does not exist")))?;

    Ok(Json(RoleResponse::new(&name, &role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    let name = RoleName::new(name)?;
    state.role_store.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Role endpoints. The whole group sits behind `require_admin`.

use crate::errors::ApiError;
use crate::models::{RoleRequest, RoleResponse};
use crate::services::role_service;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// GET /api/v1/roles
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    Ok(Json(role_service::list(&state).await?))
}

/// GET /api/v1/roles/:id
pub async fn get_role(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
) -> Result<Json<RoleResponse>, ApiError> {
    Ok(Json(role_service::find(&state, role_id).await?))
}

/// POST /api/v1/roles
pub async fn create_role(
    State(state): State<AppState>,
    Json(request): Json<RoleRequest>,
) -> Result<Response, ApiError> {
    let role = role_service::create(&state, request).await?;
    let location = format!("/api/v1/roles/{}", role.role_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(role),
    )
        .into_response())
}

/// PUT /api/v1/roles/:id
pub async fn update_role(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<RoleResponse>, ApiError> {
    Ok(Json(role_service::update(&state, role_id, request).await?))
}

/// DELETE /api/v1/roles/:id
pub async fn delete_role(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    role_service::delete(&state, role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

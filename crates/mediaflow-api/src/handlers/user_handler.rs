//! User endpoints. All routes here sit behind `require_auth`; per-user
//! routes additionally enforce owner-or-admin access.

use crate::errors::ApiError;
use crate::models::{Principal, UserRequest, UserResponse};
use crate::services::{access_control, user_service};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = user_service::find_user(&state, principal.user_id).await?;
    Ok(Json(user))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    if !access_control::can_access(Some(&principal), user_id) {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let user = user_service::find_user(&state, user_id).await?;
    Ok(Json(user))
}

/// PUT /api/v1/users/update_account/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Json(request): Json<UserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !access_control::can_access(Some(&principal), user_id) {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let acting_is_admin = access_control::is_admin(Some(&principal));
    let user = user_service::update(&state, user_id, request, acting_is_admin).await?;
    Ok(Json(user))
}

/// DELETE /api/v1/users/delete_account/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !access_control::can_access(Some(&principal), user_id) {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    user_service::delete(&state, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

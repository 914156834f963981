//! Profile endpoints.
//!
//! The profile is fetched before the ownership check, so a nonexistent
//! profile answers 404 for everyone while an existing one answers 403
//! to strangers.

use crate::errors::ApiError;
use crate::models::{Principal, ProfileRequest, ProfileResponse};
use crate::services::{access_control, profile_service};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

/// GET /api/v1/profiles/me
pub async fn my_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = profile_service::find_by_user(&state, principal.user_id).await?;
    Ok(Json(profile.into()))
}

/// GET /api/v1/profiles/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(profile_id): Path<i64>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = profile_service::find(&state, profile_id).await?;
    if !access_control::can_access(Some(&principal), profile.user_id) {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    Ok(Json(profile.into()))
}

/// PUT /api/v1/profiles/:id
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(profile_id): Path<i64>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = profile_service::find(&state, profile_id).await?;
    if !access_control::can_access(Some(&principal), profile.user_id) {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let updated = profile_service::update(&state, profile_id, request).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/profiles/:id
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(profile_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let profile = profile_service::find(&state, profile_id).await?;
    if !access_control::can_access(Some(&principal), profile.user_id) {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    profile_service::delete(&state, profile_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Public authentication endpoints.

use crate::errors::ApiError;
use crate::models::{AuthResponse, LoginRequest, UserRequest, UserResponse};
use crate::services::{auth_service, user_service};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> Result<Response, ApiError> {
    let user: UserResponse = user_service::register(&state, request).await?;
    let location = format!("/api/v1/users/{}", user.user_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(user),
    )
        .into_response())
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = auth_service::login(&state, request).await?;
    Ok(Json(response))
}

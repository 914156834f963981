//! Authentication middleware.
//!
//! [`authenticate`] runs on every route and only records the outcome of
//! token resolution in the request extensions; it never rejects. The
//! route-level gates [`require_auth`] and [`require_admin`] read that
//! outcome and abort with 401/403 where the route demands it, so public
//! routes see the same resolution logic without paying for a rejection
//! path they do not want.

use crate::crypto::TokenError;
use crate::errors::ApiError;
use crate::models::Principal;
use crate::services::access_control;
use crate::services::auth_service::{self, Resolution};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Why token resolution left the request anonymous, kept so the gate
/// can answer with the precise 401 code.
#[derive(Debug, Clone, Copy)]
pub struct AuthFailure(pub TokenError);

/// Resolve the bearer token (if any) and stash the outcome.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    match auth_service::resolve_principal(&state, auth_header.as_deref()).await {
        Resolution::Authenticated(principal) => {
            request.extensions_mut().insert(principal);
        }
        Resolution::Anonymous(Some(failure)) => {
            request.extensions_mut().insert(AuthFailure(failure));
        }
        Resolution::Anonymous(None) => {}
    }

    next.run(request).await
}

/// Reject anonymous requests with 401. The response body carries the
/// request path and the specific token failure when one was recorded.
pub async fn require_auth(request: Request, next: Next) -> Response {
    if request.extensions().get::<Principal>().is_some() {
        return next.run(request).await;
    }

    let error = match request.extensions().get::<AuthFailure>() {
        Some(AuthFailure(failure)) => ApiError::from(*failure),
        None => ApiError::Unauthenticated,
    };

    error.into_response_with_path(request.uri().path())
}

/// Reject callers without the ADMIN role with 403. Runs inside
/// [`require_auth`], so an anonymous request never reaches this gate
/// as a 403; it is refused as 401 first.
pub async fn require_admin(request: Request, next: Next) -> Response {
    use axum::response::IntoResponse;

    let principal = request.extensions().get::<Principal>();
    if access_control::is_admin(principal) {
        return next.run(request).await;
    }

    // 403 bodies carry no path, unlike the 401s from require_auth
    ApiError::Forbidden("Access denied".to_string()).into_response()
}

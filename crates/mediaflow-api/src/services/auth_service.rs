//! Authentication: login flow and per-request identity resolution.

use crate::crypto::{self, TokenError};
use crate::errors::ApiError;
use crate::models::{AuthResponse, LoginRequest, Principal};
use crate::state::AppState;

const MAX_EMAIL_LENGTH: usize = 70;
const MAX_PASSWORD_LENGTH: usize = 255;

/// Outcome of bearer-token resolution for one request.
///
/// Resolution never fails the request: a missing or broken token leaves
/// the request anonymous, and any decode failure kind is kept so the
/// authentication entry point can surface it if a protected route is hit.
#[derive(Debug)]
pub enum Resolution {
    Authenticated(Principal),
    Anonymous(Option<TokenError>),
}

/// Resolve an `Authorization` header value into a [`Principal`].
///
/// The subject's roles are re-fetched from storage on every call: the
/// roles embedded in the token are display data only, so role changes in
/// storage take effect on the very next request without invalidating
/// outstanding tokens.
pub async fn resolve_principal(state: &AppState, auth_header: Option<&str>) -> Resolution {
    // No header or not a bearer credential: anonymous, not an error.
    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Resolution::Anonymous(None),
    };

    let claims = match state.tokens.decode(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(target: "api.auth", error = %e, "Token rejected");
            return Resolution::Anonymous(Some(e));
        }
    };

    // Live role fetch; the token's embedded roles are never trusted here.
    let user = match state.users.find_by_email(&claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(target: "api.auth", "Token subject no longer exists");
            return Resolution::Anonymous(None);
        }
        Err(e) => {
            tracing::warn!(target: "api.auth", error = %e, "User lookup failed during resolution");
            return Resolution::Anonymous(None);
        }
    };

    let roles = match state.users.roles_of(user.user_id).await {
        Ok(roles) => roles.into_iter().map(|r| r.name).collect(),
        Err(e) => {
            tracing::warn!(target: "api.auth", error = %e, "Role lookup failed during resolution");
            return Resolution::Anonymous(None);
        }
    };

    Resolution::Authenticated(Principal {
        user_id: user.user_id,
        subject: user.email,
        roles,
    })
}

/// Authenticate credentials and issue a bearer token.
///
/// Unknown email maps to 404 while a wrong password maps to 401. That
/// asymmetry leaks account existence; it is intentional, long-standing
/// API behavior and is preserved as-is.
pub async fn login(state: &AppState, request: LoginRequest) -> Result<AuthResponse, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }
    if request.password.is_empty() || request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation("Invalid password".to_string()));
    }

    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid credentials".to_string()))?;

    if !crypto::verify_password(&request.password, &user.password_hash)? {
        tracing::debug!(target: "api.auth", user_id = user.user_id, "Login password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    let roles: Vec<String> = state
        .users
        .roles_of(user.user_id)
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();

    // Role names and user id ride along in the token for the client;
    // authorization re-reads them from storage each request.
    let token = state.tokens.issue(&user.email, user.user_id, &roles)?;
    let profile = state.profiles.find_by_user(user.user_id).await?;

    tracing::info!(target: "api.auth", user_id = user.user_id, "Login succeeded");

    Ok(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.ttl_seconds(),
        user_id: user.user_id,
        user_name: user.name,
        email: user.email,
        date_birth: user.date_birth,
        roles,
        profile_id: profile.as_ref().map(|p| p.profile_id),
        display_name: profile.as_ref().map(|p| p.display_name.clone()),
        preferred_language: profile.as_ref().map(|p| p.preferred_language.clone()),
        avatar_url: profile.as_ref().map(|p| p.avatar_url.clone()),
        bio: profile.map(|p| p.bio),
    })
}

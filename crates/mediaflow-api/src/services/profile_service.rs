//! Profile management.
//!
//! Profiles are looked up before any ownership check so a missing
//! profile reads as 404 rather than leaking through a 403.

use crate::errors::ApiError;
use crate::models::{Profile, ProfileRequest, ProfileResponse};
use crate::state::AppState;

const MAX_DISPLAY_NAME_LENGTH: usize = 30;
const MAX_LANGUAGE_LENGTH: usize = 30;
const MAX_AVATAR_URL_LENGTH: usize = 255;
const MAX_BIO_LENGTH: usize = 500;

pub async fn find(state: &AppState, profile_id: i64) -> Result<Profile, ApiError> {
    state
        .profiles
        .find_by_id(profile_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile not found: {}", profile_id)))
}

pub async fn find_by_user(state: &AppState, user_id: i64) -> Result<Profile, ApiError> {
    state
        .profiles
        .find_by_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile not found for user: {}", user_id)))
}

pub async fn update(
    state: &AppState,
    profile_id: i64,
    request: ProfileRequest,
) -> Result<ProfileResponse, ApiError> {
    validate(&request)?;

    let mut profile = find(state, profile_id).await?;
    profile.display_name = request.display_name;
    profile.preferred_language = request.preferred_language;
    profile.avatar_url = request.avatar_url;
    profile.bio = request.bio;

    state.profiles.update(&profile).await?;
    Ok(profile.into())
}

pub async fn delete(state: &AppState, profile_id: i64) -> Result<(), ApiError> {
    // Existence check first so the caller gets 404, not a silent no-op
    let profile = find(state, profile_id).await?;
    state.profiles.delete(profile.profile_id).await?;
    tracing::info!(target: "api.profiles", profile_id, "Profile deleted");
    Ok(())
}

fn validate(request: &ProfileRequest) -> Result<(), ApiError> {
    if request.display_name.trim().is_empty()
        || request.display_name.len() > MAX_DISPLAY_NAME_LENGTH
    {
        return Err(ApiError::Validation("Invalid display name".to_string()));
    }
    if request.preferred_language.trim().is_empty()
        || request.preferred_language.len() > MAX_LANGUAGE_LENGTH
    {
        return Err(ApiError::Validation(
            "Invalid preferred language".to_string(),
        ));
    }
    if request.avatar_url.trim().is_empty() || request.avatar_url.len() > MAX_AVATAR_URL_LENGTH {
        return Err(ApiError::Validation("Invalid avatar URL".to_string()));
    }
    if request.bio.trim().is_empty() || request.bio.len() > MAX_BIO_LENGTH {
        return Err(ApiError::Validation("Invalid bio".to_string()));
    }
    Ok(())
}

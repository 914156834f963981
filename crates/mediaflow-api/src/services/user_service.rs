//! User account management: registration, lookup, update, removal.

use crate::crypto;
use crate::errors::ApiError;
use crate::models::{
    NewProfile, NewUser, UserRequest, UserResponse, DEFAULT_ROLE_ID, RESTRICTED_ROLES,
};
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 70;
const MAX_EMAIL_LENGTH: usize = 70;
const MAX_PASSWORD_LENGTH: usize = 70;
const MAX_LANGUAGE_LENGTH: usize = 30;

const DEFAULT_LANGUAGE: &str = "es";
const DEFAULT_AVATAR_URL: &str = "https://www.gravatar.com/avatar/?d=mp";
const DEFAULT_BIO: &str = "Hello! I am new here.";

/// Register a new account.
///
/// The default role is always granted. Extra role ids from the request
/// are honored unless they name a restricted role, which only an
/// administrator may assign through [`update`]. A default profile is
/// created alongside the account.
pub async fn register(state: &AppState, request: UserRequest) -> Result<UserResponse, ApiError> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    let password = request
        .password
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Password is required".to_string()))?;
    validate_password(password)?;
    if let Some(lang) = request.preferred_language.as_deref() {
        validate_language(lang)?;
    }

    if state.users.email_exists(&request.email).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let role_ids = resolve_role_ids(state, request.roles.as_deref(), &[], false).await?;

    let password_hash = crypto::hash_password(password, crypto::DEFAULT_BCRYPT_COST)?;
    let user = state
        .users
        .create(NewUser {
            name: request.name.clone(),
            email: request.email.clone(),
            password_hash,
            date_birth: request.date_birth,
        })
        .await?;

    state.users.set_roles(user.user_id, &role_ids).await?;

    state
        .profiles
        .create(NewProfile {
            user_id: user.user_id,
            display_name: user.name.clone(),
            preferred_language: request
                .preferred_language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            bio: DEFAULT_BIO.to_string(),
        })
        .await?;

    tracing::info!(target: "api.users", user_id = user.user_id, "User registered");

    to_response(state, user).await
}

/// Fetch one user with roles and profile.
pub async fn find_user(state: &AppState, user_id: i64) -> Result<UserResponse, ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", user_id)))?;

    to_response(state, user).await
}

/// Update an existing account.
///
/// `acting_is_admin` controls whether restricted roles may be granted:
/// a non-admin caller can keep restricted roles they already hold but
/// cannot add new ones.
pub async fn update(
    state: &AppState,
    user_id: i64,
    request: UserRequest,
    acting_is_admin: bool,
) -> Result<UserResponse, ApiError> {
    let mut user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", user_id)))?;

    validate_name(&request.name)?;
    validate_email(&request.email)?;
    if let Some(lang) = request.preferred_language.as_deref() {
        validate_language(lang)?;
    }

    if request.email != user.email && state.users.email_exists(&request.email).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    // Resolve the requested role set before writing anything, so a
    // rejected role change leaves the whole account untouched.
    let role_ids = match request.roles.as_deref() {
        Some(requested) => {
            let held: Vec<String> = state
                .users
                .roles_of(user_id)
                .await?
                .into_iter()
                .map(|r| r.name)
                .collect();
            Some(resolve_role_ids(state, Some(requested), &held, acting_is_admin).await?)
        }
        None => None,
    };

    user.name = request.name;
    user.email = request.email;
    user.date_birth = request.date_birth;

    if let Some(password) = request.password.as_deref() {
        validate_password(password)?;
        user.password_hash = crypto::hash_password(password, crypto::DEFAULT_BCRYPT_COST)?;
    }

    state.users.update(&user).await?;

    if let Some(role_ids) = role_ids {
        state.users.set_roles(user_id, &role_ids).await?;
    }

    if let Some(language) = request.preferred_language {
        if let Some(mut profile) = state.profiles.find_by_user(user_id).await? {
            profile.preferred_language = language;
            state.profiles.update(&profile).await?;
        }
    }

    tracing::info!(target: "api.users", user_id, "User updated");

    to_response(state, user).await
}

/// Delete an account. The profile and role memberships go with it.
pub async fn delete(state: &AppState, user_id: i64) -> Result<(), ApiError> {
    if !state.users.exists(user_id).await? {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    state.users.delete(user_id).await?;
    tracing::info!(target: "api.users", user_id, "User deleted");
    Ok(())
}

/// Resolve requested role ids against storage, always including the
/// default role, deduplicated.
async fn resolve_role_ids(
    state: &AppState,
    requested: Option<&[i64]>,
    held_role_names: &[String],
    acting_is_admin: bool,
) -> Result<Vec<i64>, ApiError> {
    let mut role_ids = vec![DEFAULT_ROLE_ID];

    for &role_id in requested.unwrap_or_default() {
        if role_ids.contains(&role_id) {
            continue;
        }

        let role = state
            .roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("Unknown role id: {}", role_id)))?;

        let restricted = RESTRICTED_ROLES
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&role.name));
        let already_held = held_role_names
            .iter()
            .any(|h| h.eq_ignore_ascii_case(&role.name));

        if restricted && !acting_is_admin && !already_held {
            return Err(ApiError::Validation(format!(
                "Role {} cannot be self-assigned",
                role.name
            )));
        }

        role_ids.push(role_id);
    }

    Ok(role_ids)
}

async fn to_response(state: &AppState, user: crate::models::User) -> Result<UserResponse, ApiError> {
    let roles = state
        .users
        .roles_of(user.user_id)
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();
    let profile = state.profiles.find_by_user(user.user_id).await?;

    Ok(UserResponse {
        user_id: user.user_id,
        name: user.name,
        email: user.email,
        date_birth: user.date_birth,
        roles,
        profile: profile.map(Into::into),
    })
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::Validation("Invalid name".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let well_formed = email.len() <= MAX_EMAIL_LENGTH
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        });
    if !well_formed {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation("Invalid password".to_string()));
    }
    Ok(())
}

fn validate_language(language: &str) -> Result<(), ApiError> {
    if language.trim().is_empty() || language.len() > MAX_LANGUAGE_LENGTH {
        return Err(ApiError::Validation(
            "Invalid preferred language".to_string(),
        ));
    }
    Ok(())
}

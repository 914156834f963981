//! Role management (admin-only surface).

use crate::errors::ApiError;
use crate::models::{Role, RoleRequest, RoleResponse};
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 50;
const MAX_DESCRIPTION_LENGTH: usize = 255;

pub async fn list(state: &AppState) -> Result<Vec<RoleResponse>, ApiError> {
    let roles = state.roles.find_all().await?;
    Ok(roles.into_iter().map(Into::into).collect())
}

pub async fn find(state: &AppState, role_id: i64) -> Result<RoleResponse, ApiError> {
    state
        .roles
        .find_by_id(role_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound(format!("Role not found: {}", role_id)))
}

/// Create a role. Names are stored uppercase and must be unique
/// case-insensitively.
pub async fn create(state: &AppState, request: RoleRequest) -> Result<RoleResponse, ApiError> {
    validate(&request)?;

    let name = request.name.trim().to_uppercase();
    if state.roles.name_exists(&name).await? {
        return Err(ApiError::Conflict(format!("Role already exists: {}", name)));
    }

    let role = state.roles.create(&name, request.description.trim()).await?;
    tracing::info!(target: "api.roles", role_id = role.role_id, "Role created");
    Ok(role.into())
}

pub async fn update(
    state: &AppState,
    role_id: i64,
    request: RoleRequest,
) -> Result<RoleResponse, ApiError> {
    validate(&request)?;

    let existing = state
        .roles
        .find_by_id(role_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Role not found: {}", role_id)))?;

    let name = request.name.trim().to_uppercase();
    if !name.eq_ignore_ascii_case(&existing.name) && state.roles.name_exists(&name).await? {
        return Err(ApiError::Conflict(format!("Role already exists: {}", name)));
    }

    let role = Role {
        role_id,
        name,
        description: request.description.trim().to_string(),
    };
    state.roles.update(&role).await?;
    Ok(role.into())
}

pub async fn delete(state: &AppState, role_id: i64) -> Result<(), ApiError> {
    if state.roles.find_by_id(role_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Role not found: {}", role_id)));
    }

    state.roles.delete(role_id).await?;
    tracing::info!(target: "api.roles", role_id, "Role deleted");
    Ok(())
}

fn validate(request: &RoleRequest) -> Result<(), ApiError> {
    let name = request.name.trim();
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::Validation("Invalid role name".to_string()));
    }
    if request.description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(ApiError::Validation("Invalid role description".to_string()));
    }
    Ok(())
}

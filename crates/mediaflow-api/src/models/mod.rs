//! Data models: database entities, request/response DTOs, and the
//! per-request [`Principal`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Role ids that every account receives implicitly (VIEWER).
pub const DEFAULT_ROLE_ID: i64 = 1;

/// Role names that cannot be self-assigned during registration or
/// self-update. Only an administrator may grant these.
pub const RESTRICTED_ROLES: [&str; 2] = ["ADMIN", "MODERATOR"];

/// User entity (maps to the users table).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub date_birth: NaiveDate,
}

/// Data for inserting a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub date_birth: NaiveDate,
}

/// Role entity (maps to the roles table).
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub role_id: i64,
    pub name: String,
    pub description: String,
}

/// Profile entity (maps to the profiles table). Each profile belongs to
/// exactly one user.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub profile_id: i64,
    pub user_id: i64,
    pub display_name: String,
    pub preferred_language: String,
    pub avatar_url: String,
    pub bio: String,
}

/// Data for inserting a new profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: i64,
    pub display_name: String,
    pub preferred_language: String,
    pub avatar_url: String,
    pub bio: String,
}

/// Authenticated identity for the current request.
///
/// Constructed once per request by the authentication middleware from a
/// valid bearer token, with roles re-fetched from storage (never taken
/// from the token payload). Anonymous requests carry no `Principal` at
/// all; authorization predicates treat its absence as deny.
#[derive(Clone)]
pub struct Principal {
    /// Stable user id.
    pub user_id: i64,
    /// Token subject (the user's email) - redacted in Debug output.
    pub subject: String,
    /// Live role names fetched from storage at resolution time.
    pub roles: Vec<String>,
}

/// The subject is an email address and should not leak into logs.
impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("subject", &"[REDACTED]")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Registration / account-update request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub date_birth: NaiveDate,
    /// Optional role ids in addition to the default role.
    pub roles: Option<Vec<i64>>,
    pub preferred_language: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the bearer token plus display data for the client.
///
/// The embedded roles are informational only; authorization always
/// consults storage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user_id: i64,
    pub user_name: String,
    pub email: String,
    pub date_birth: NaiveDate,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// User response DTO.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub date_birth: NaiveDate,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileResponse>,
}

/// Role create/update request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    pub description: String,
}

/// Role response DTO.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub role_id: i64,
    pub name: String,
    pub description: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.role_id,
            name: role.name,
            description: role.description,
        }
    }
}

/// Profile update request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub display_name: String,
    pub preferred_language: String,
    pub avatar_url: String,
    pub bio: String,
}

/// Profile response DTO.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile_id: i64,
    pub display_name: String,
    pub preferred_language: String,
    pub avatar_url: String,
    pub bio: String,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            profile_id: profile.profile_id,
            display_name: profile.display_name,
            preferred_language: profile.preferred_language,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_debug_redacts_subject() {
        let principal = Principal {
            user_id: 7,
            subject: "alice@example.com".to_string(),
            roles: vec!["VIEWER".to_string()],
        };

        let debug_str = format!("{:?}", principal);
        assert!(!debug_str.contains("alice@example.com"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_auth_response_uses_camel_case_keys() {
        let response = AuthResponse {
            token: "t".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
            user_id: 1,
            user_name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            date_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            roles: vec!["VIEWER".to_string()],
            profile_id: None,
            display_name: None,
            preferred_language: None,
            avatar_url: None,
            bio: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("tokenType").is_some());
        assert!(json.get("expiresIn").is_some());
        assert!(json.get("userId").is_some());
        assert!(json.get("profileId").is_none(), "None fields are omitted");
    }
}

//! Error types and their HTTP mapping.
//!
//! The taxonomy is a closed set with stable machine-readable `code`
//! values. Token failures carry their kind from the codec; nothing in
//! this module inspects error message text to decide a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    TokenInvalid,

    #[error("Malformed token")]
    TokenMalformed,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal,
}

/// Structured error body: `{ timestamp, code, message, path? }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TokenExpired
            | ApiError::TokenInvalid
            | ApiError::TokenMalformed
            | ApiError::Unauthenticated
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::TokenInvalid => "TOKEN_INVALID",
            ApiError::TokenMalformed => "TOKEN_MALFORMED",
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message. Internal detail is never echoed back.
    pub fn message(&self) -> String {
        match self {
            ApiError::TokenExpired => {
                "The token has expired. Please log in again.".to_string()
            }
            ApiError::TokenInvalid => {
                "Invalid token. Please provide a valid token.".to_string()
            }
            ApiError::TokenMalformed => {
                "Malformed token. Check the token format.".to_string()
            }
            ApiError::Unauthenticated => "Authentication required".to_string(),
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Validation(msg) => msg.clone(),
            ApiError::Database(_) => "An internal database error occurred".to_string(),
            ApiError::Internal => "An internal error occurred".to_string(),
        }
    }

    /// Build the JSON body, optionally stamped with the request path.
    ///
    /// Only the authentication entry point passes a path; handler errors
    /// leave it out.
    pub fn body(&self, path: Option<&str>) -> ErrorBody {
        ErrorBody {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            code: self.code().to_string(),
            message: self.message(),
            path: path.map(|p| p.to_string()),
        }
    }

    /// Full response with the request path included, used by the
    /// authentication entry point.
    pub fn into_response_with_path(self, path: &str) -> Response {
        (self.status(), Json(self.body(Some(path)))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, ApiError::Database(_) | ApiError::Internal) {
            tracing::error!(target: "api.errors", error = %self, "Request failed");
        }
        (self.status(), Json(self.body(None))).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenInvalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenMalformed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("no".to_string()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("missing".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("dup".to_string()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Validation("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_database_detail_not_echoed() {
        let err = ApiError::Database("connection refused to 10.0.0.3".to_string());
        assert!(!err.message().contains("10.0.0.3"));
    }

    #[test]
    fn test_body_includes_path_when_given() {
        let body = ApiError::TokenExpired.body(Some("/api/v1/users/me"));
        assert_eq!(body.code, "TOKEN_EXPIRED");
        assert_eq!(body.path.as_deref(), Some("/api/v1/users/me"));

        let body = ApiError::TokenExpired.body(None);
        assert!(body.path.is_none());
    }
}

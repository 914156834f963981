//! Cryptographic operations: password hashing and the bearer-token codec.
//!
//! Tokens are HS256 JWTs signed with a single shared secret. The codec
//! returns a closed [`TokenError`] kind decided at the point of failure;
//! callers never inspect message text to classify a failure.

use crate::errors::ApiError;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bcrypt cost for stored password hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Tokens larger than this are rejected before any parsing.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!(target: "api.crypto", error = %e, "Password hashing failed");
        ApiError::Internal
    })
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    bcrypt::verify(password, hash).map_err(|e| {
        tracing::error!(target: "api.crypto", error = %e, "Password verification failed");
        ApiError::Internal
    })
}

/// Token validation failures, one kind per user-facing message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally valid token whose expiry has passed.
    #[error("token expired")]
    Expired,

    /// Signature does not verify against the shared secret.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token structure cannot be parsed.
    #[error("malformed token")]
    Malformed,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::InvalidSignature => ApiError::TokenInvalid,
            TokenError::Malformed => ApiError::TokenMalformed,
        }
    }
}

/// Claims carried in the token payload.
///
/// `roles` and `user_id` are embedded for client display only; the
/// authorization layer re-fetches roles from storage on every request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user's email.
    pub sub: String,
    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,
    /// Stable user id.
    pub user_id: i64,
    /// Role names at issuance time (informational).
    pub roles: Vec<String>,
}

/// The subject is an email address and should not leak into logs.
impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("user_id", &self.user_id)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Issues and validates HS256 bearer tokens against the shared secret.
///
/// The secret is read-only process-wide configuration; the codec is
/// cheap to clone and safe to share across request tasks.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Configured token lifetime in seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token with the configured lifetime.
    pub fn issue(
        &self,
        subject: &str,
        user_id: i64,
        roles: &[String],
    ) -> Result<String, ApiError> {
        self.issue_with_ttl(subject, user_id, roles, self.ttl)
    }

    /// Issue a token with an explicit lifetime. A zero or negative `ttl`
    /// produces an already-expired token.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        user_id: i64,
        roles: &[String],
        ttl: Duration,
    ) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: subject.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            user_id,
            roles: roles.to_vec(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(target: "api.crypto", error = %e, "Token encoding failed");
            ApiError::Internal
        })
    }

    /// Parse and verify a token, returning its claims.
    ///
    /// Expiry is compared with zero leeway against the same clock used
    /// at issuance.
    pub fn decode(&self, token: &str) -> Result<AccessClaims, TokenError> {
        if token.len() > MAX_TOKEN_SIZE_BYTES {
            return Err(TokenError::Malformed);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        match decode::<AccessClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => Err(classify(e.kind())),
        }
    }

    /// Convenience projection of [`Self::decode`].
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.decode(token)?.sub)
    }
}

/// Map library error kinds onto the closed taxonomy.
fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"unit-test-secret-of-sufficient-length";

    fn codec() -> TokenCodec {
        TokenCodec::new(TEST_SECRET, 3600)
    }

    fn roles() -> Vec<String> {
        vec!["VIEWER".to_string(), "ADMIN".to_string()]
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("pw123", 4).unwrap();
        assert!(verify_password("pw123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let codec = codec();
        let token = codec.issue("a@b.com", 42, &roles()).unwrap();

        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.roles, roles());
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_extract_subject() {
        let codec = codec();
        let token = codec.issue("a@b.com", 1, &[]).unwrap();
        assert_eq!(codec.extract_subject(&token).unwrap(), "a@b.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let token = codec
            .issue_with_ttl("a@b.com", 1, &[], Duration::seconds(-10))
            .unwrap();

        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
        assert_eq!(codec.extract_subject(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_zero_ttl_token_expires() {
        let codec = codec();
        let token = codec
            .issue_with_ttl("a@b.com", 1, &[], Duration::seconds(0))
            .unwrap();

        // exp == iat; one tick past issuance the token is dead.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = codec();
        let token = codec.issue("a@b.com", 1, &roles()).unwrap();

        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut sig_bytes: Vec<u8> = signature.bytes().collect();
        sig_bytes[10] = if sig_bytes[10] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{}.{}", head, String::from_utf8(sig_bytes).unwrap());

        assert_eq!(codec.decode(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let token = codec.issue("a@b.com", 1, &roles()).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let mut payload: Vec<u8> = parts[1].bytes().collect();
        payload[5] = if payload[5] == b'A' { b'B' } else { b'A' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            String::from_utf8(payload).unwrap(),
            parts[2]
        );

        assert_eq!(codec.decode(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec().issue("a@b.com", 1, &[]).unwrap();
        let other = TokenCodec::new(b"a-completely-different-shared-secret", 3600);

        assert_eq!(other.decode(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.decode("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(codec.decode(""), Err(TokenError::Malformed));
        assert_eq!(codec.decode("a.b.c"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_oversized_token_is_malformed() {
        let codec = codec();
        let huge = "x".repeat(MAX_TOKEN_SIZE_BYTES + 1);
        assert_eq!(codec.decode(&huge), Err(TokenError::Malformed));
    }

    #[test]
    fn test_access_claims_debug_redacts_subject() {
        let claims = AccessClaims {
            sub: "a@b.com".to_string(),
            exp: 2,
            iat: 1,
            user_id: 1,
            roles: vec![],
        };
        let debug_str = format!("{:?}", claims);
        assert!(!debug_str.contains("a@b.com"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}

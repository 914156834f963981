use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Minimum accepted signing secret length in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime: 24 hours.
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Shared HS256 signing secret, loaded once at startup and never
    /// mutated afterwards.
    pub jwt_secret: Vec<u8>,
    pub token_ttl_seconds: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidSecret(String),

    #[error("Invalid token TTL: {0}")]
    InvalidTtl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?
            .clone()
            .into_bytes();

        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_SECRET_LEN,
                jwt_secret.len()
            )));
        }

        let token_ttl_seconds = match vars.get("TOKEN_TTL_SECONDS") {
            Some(raw) => {
                let ttl: i64 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidTtl(format!("Not a number: {}", raw)))?;
                if ttl <= 0 {
                    return Err(ConfigError::InvalidTtl(format!(
                        "Must be positive, got {}",
                        ttl
                    )));
                }
                ttl
            }
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            token_ttl_seconds,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn test_secret() -> String {
        "0123456789abcdef0123456789abcdef".to_string()
    }

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://localhost/mediaflow".to_string(),
            ),
            ("JWT_SECRET".to_string(), test_secret()),
        ])
    }

    #[test]
    fn test_from_vars_success() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert("TOKEN_TTL_SECONDS".to_string(), "3600".to_string());

        let config = Config::from_vars(&vars).expect("Config should load");

        assert_eq!(config.database_url, "postgresql://localhost/mediaflow");
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.jwt_secret, test_secret().into_bytes());
        assert_eq!(config.token_ttl_seconds, 3600);
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load");
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.token_ttl_seconds, 86_400);
    }

    #[test]
    fn test_from_vars_missing_database_url() {
        let vars = HashMap::from([("JWT_SECRET".to_string(), test_secret())]);
        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "DATABASE_URL"));
    }

    #[test]
    fn test_from_vars_missing_secret() {
        let vars = HashMap::from([(
            "DATABASE_URL".to_string(),
            "postgresql://localhost/mediaflow".to_string(),
        )]);
        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "JWT_SECRET"));
    }

    #[test]
    fn test_from_vars_secret_too_short() {
        let mut vars = base_vars();
        vars.insert("JWT_SECRET".to_string(), "short".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidSecret(msg)) if msg.contains("got 5"))
        );
    }

    #[test]
    fn test_from_vars_invalid_ttl() {
        let mut vars = base_vars();
        vars.insert("TOKEN_TTL_SECONDS".to_string(), "abc".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidTtl(_))
        ));

        let mut vars = base_vars();
        vars.insert("TOKEN_TTL_SECONDS".to_string(), "0".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidTtl(_))
        ));
    }
}

//! User storage: lookup, persistence, and role membership.

use crate::errors::ApiError;
use crate::models::{NewUser, Role, User};
use async_trait::async_trait;
use sqlx::PgPool;

/// Persistence collaborator for users and their role memberships.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, ApiError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    async fn email_exists(&self, email: &str) -> Result<bool, ApiError>;

    async fn exists(&self, user_id: i64) -> Result<bool, ApiError>;

    async fn create(&self, new_user: NewUser) -> Result<User, ApiError>;

    async fn update(&self, user: &User) -> Result<(), ApiError>;

    async fn delete(&self, user_id: i64) -> Result<(), ApiError>;

    /// Current roles of a user, ordered by name. This is the live role
    /// set the authorization layer consults on every request.
    async fn roles_of(&self, user_id: i64) -> Result<Vec<Role>, ApiError>;

    /// Replace a user's role memberships with the given role ids.
    async fn set_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<(), ApiError>;
}

/// Postgres-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, date_birth
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch user by id: {}", e)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password_hash, date_birth
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch user by email: {}", e)))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to check email existence: {}", e)))?;

        Ok(exists.0)
    }

    async fn exists(&self, user_id: i64) -> Result<bool, ApiError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to check user existence: {}", e)))?;

        Ok(exists.0)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, date_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, name, email, password_hash, date_birth
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.date_birth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Unique constraint on email
            if e.to_string().contains("users_email_key") {
                ApiError::Conflict("Email already registered".to_string())
            } else {
                ApiError::Database(format!("Failed to create user: {}", e))
            }
        })
    }

    async fn update(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, date_birth = $5
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.date_birth)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("users_email_key") {
                ApiError::Conflict("Email already registered".to_string())
            } else {
                ApiError::Database(format!("Failed to update user: {}", e))
            }
        })?;

        Ok(())
    }

    async fn delete(&self, user_id: i64) -> Result<(), ApiError> {
        // Profile and role memberships go with the user (ON DELETE CASCADE)
        sqlx::query(
            r#"
            DELETE FROM users WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to delete user: {}", e)))?;

        Ok(())
    }

    async fn roles_of(&self, user_id: i64) -> Result<Vec<Role>, ApiError> {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT r.role_id, r.name, r.description
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch user roles: {}", e)))
    }

    async fn set_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<(), ApiError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ApiError::Database(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(
            r#"
            DELETE FROM user_roles WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to clear user roles: {}", e)))?;

        for role_id in role_ids {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ApiError::Database(format!("Failed to assign role: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| ApiError::Database(format!("Failed to commit role assignment: {}", e)))
    }
}

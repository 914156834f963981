//! Role storage.

use crate::errors::ApiError;
use crate::models::Role;
use async_trait::async_trait;
use sqlx::PgPool;

/// Persistence collaborator for roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_by_id(&self, role_id: i64) -> Result<Option<Role>, ApiError>;

    async fn find_all(&self) -> Result<Vec<Role>, ApiError>;

    async fn name_exists(&self, name: &str) -> Result<bool, ApiError>;

    async fn create(&self, name: &str, description: &str) -> Result<Role, ApiError>;

    async fn update(&self, role: &Role) -> Result<(), ApiError>;

    async fn delete(&self, role_id: i64) -> Result<(), ApiError>;
}

/// Postgres-backed [`RoleStore`].
#[derive(Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn find_by_id(&self, role_id: i64) -> Result<Option<Role>, ApiError> {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT role_id, name, description
            FROM roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch role: {}", e)))
    }

    async fn find_all(&self) -> Result<Vec<Role>, ApiError> {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT role_id, name, description
            FROM roles
            ORDER BY role_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to list roles: {}", e)))
    }

    async fn name_exists(&self, name: &str) -> Result<bool, ApiError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM roles WHERE UPPER(name) = UPPER($1))
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to check role name: {}", e)))?;

        Ok(exists.0)
    }

    async fn create(&self, name: &str, description: &str) -> Result<Role, ApiError> {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING role_id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("roles_name_key") {
                ApiError::Conflict(format!("Role already exists: {}", name))
            } else {
                ApiError::Database(format!("Failed to create role: {}", e))
            }
        })
    }

    async fn update(&self, role: &Role) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, description = $3
            WHERE role_id = $1
            "#,
        )
        .bind(role.role_id)
        .bind(&role.name)
        .bind(&role.description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("roles_name_key") {
                ApiError::Conflict(format!("Role already exists: {}", role.name))
            } else {
                ApiError::Database(format!("Failed to update role: {}", e))
            }
        })?;

        Ok(())
    }

    async fn delete(&self, role_id: i64) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            DELETE FROM roles WHERE role_id = $1
            "#,
        )
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Still referenced from user_roles
            if e.to_string().contains("user_roles_role_id_fkey") {
                ApiError::Conflict("Cannot delete role: still in use".to_string())
            } else {
                ApiError::Database(format!("Failed to delete role: {}", e))
            }
        })?;

        Ok(())
    }
}

//! Profile storage.

use crate::errors::ApiError;
use crate::models::{NewProfile, Profile};
use async_trait::async_trait;
use sqlx::PgPool;

/// Persistence collaborator for user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_id(&self, profile_id: i64) -> Result<Option<Profile>, ApiError>;

    async fn find_by_user(&self, user_id: i64) -> Result<Option<Profile>, ApiError>;

    async fn create(&self, new_profile: NewProfile) -> Result<Profile, ApiError>;

    async fn update(&self, profile: &Profile) -> Result<(), ApiError>;

    async fn delete(&self, profile_id: i64) -> Result<(), ApiError>;
}

/// Postgres-backed [`ProfileStore`].
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_id(&self, profile_id: i64) -> Result<Option<Profile>, ApiError> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT profile_id, user_id, display_name, preferred_language, avatar_url, bio
            FROM profiles
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch profile: {}", e)))
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Option<Profile>, ApiError> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT profile_id, user_id, display_name, preferred_language, avatar_url, bio
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to fetch profile by user: {}", e)))
    }

    async fn create(&self, new_profile: NewProfile) -> Result<Profile, ApiError> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, display_name, preferred_language, avatar_url, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING profile_id, user_id, display_name, preferred_language, avatar_url, bio
            "#,
        )
        .bind(new_profile.user_id)
        .bind(&new_profile.display_name)
        .bind(&new_profile.preferred_language)
        .bind(&new_profile.avatar_url)
        .bind(&new_profile.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to create profile: {}", e)))
    }

    async fn update(&self, profile: &Profile) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE profiles
            SET display_name = $2, preferred_language = $3, avatar_url = $4, bio = $5
            WHERE profile_id = $1
            "#,
        )
        .bind(profile.profile_id)
        .bind(&profile.display_name)
        .bind(&profile.preferred_language)
        .bind(&profile.avatar_url)
        .bind(&profile.bio)
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to update profile: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, profile_id: i64) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            DELETE FROM profiles WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::Database(format!("Failed to delete profile: {}", e)))?;

        Ok(())
    }
}

//! Shared application state.

use crate::config::Config;
use crate::crypto::TokenCodec;
use crate::repositories::{
    PgProfileStore, PgRoleStore, PgUserStore, ProfileStore, RoleStore, UserStore,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Read-only state handed to every request task. The store handles are
/// trait objects so tests can swap in the in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub tokens: TokenCodec,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        profiles: Arc<dyn ProfileStore>,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            users,
            roles,
            profiles,
            tokens,
        }
    }

    /// Production wiring: Postgres stores plus the codec from config.
    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        Self::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgRoleStore::new(pool.clone())),
            Arc::new(PgProfileStore::new(pool)),
            TokenCodec::new(&config.jwt_secret, config.token_ttl_seconds),
        )
    }
}

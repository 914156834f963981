//! In-memory storage backend.
//!
//! Implements the three store traits over a shared `Mutex`, with the
//! same observable semantics as the Postgres implementations: email and
//! role-name uniqueness conflicts, name-ordered role lookups, cascading
//! user deletion, and refusal to delete a role still in use.

use async_trait::async_trait;
use mediaflow_api::crypto::TokenCodec;
use mediaflow_api::errors::ApiError;
use mediaflow_api::models::{NewProfile, NewUser, Profile, Role, User};
use mediaflow_api::repositories::{ProfileStore, RoleStore, UserStore};
use mediaflow_api::state::AppState;
use std::sync::{Arc, Mutex, MutexGuard};

/// Low bcrypt cost keeps seeded fixtures fast.
const TEST_BCRYPT_COST: u32 = 4;

/// Secret for the test token codec, long enough to pass config checks.
pub const TEST_JWT_SECRET: &[u8] = b"test-secret-0123456789abcdefghijklmnopqrstuv";

const DEFAULT_TEST_TTL_SECONDS: i64 = 3600;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    roles: Vec<Role>,
    user_roles: Vec<(i64, i64)>,
    profiles: Vec<Profile>,
    next_user_id: i64,
    next_role_id: i64,
    next_profile_id: i64,
}

/// Cloneable handle over shared in-memory tables. The same handle backs
/// all three store traits, so fixture mutations are immediately visible
/// to code under test.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store seeded with the standard roles; VIEWER takes id 1 as
    /// the default role.
    pub fn new() -> Self {
        let store = Self {
            inner: Arc::new(Mutex::new(Inner {
                next_user_id: 1,
                next_role_id: 1,
                next_profile_id: 1,
                ..Inner::default()
            })),
        };
        for (name, description) in [
            ("VIEWER", "Default role for registered users"),
            ("ADMIN", "Full administrative access"),
            ("MODERATOR", "Content moderation privileges"),
        ] {
            store.seed_role(name, description);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn seed_role(&self, name: &str, description: &str) -> i64 {
        let mut inner = self.lock();
        if let Some(role) = inner
            .roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
        {
            return role.role_id;
        }
        let role_id = inner.next_role_id;
        inner.next_role_id += 1;
        inner.roles.push(Role {
            role_id,
            name: name.to_string(),
            description: description.to_string(),
        });
        role_id
    }

    /// Id of a seeded (or previously added) role, by name.
    pub fn role_id(&self, name: &str) -> i64 {
        let inner = self.lock();
        inner
            .roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| r.role_id)
            .unwrap_or_else(|| panic!("Role not seeded: {}", name))
    }

    /// Insert a user with a bcrypt-hashed password and the given role
    /// names. Unknown role names are created on the fly.
    pub fn add_user(&self, email: &str, password: &str, role_names: &[&str]) -> i64 {
        let password_hash = match bcrypt::hash(password, TEST_BCRYPT_COST) {
            Ok(hash) => hash,
            Err(e) => panic!("Failed to hash fixture password: {}", e),
        };
        let name = email.split('@').next().unwrap_or(email).to_string();

        let user_id = {
            let mut inner = self.lock();
            let user_id = inner.next_user_id;
            inner.next_user_id += 1;
            inner.users.push(User {
                user_id,
                name,
                email: email.to_string(),
                password_hash,
                date_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 1)
                    .unwrap_or_default(),
            });
            user_id
        };

        self.set_role_names(user_id, role_names);
        user_id
    }

    /// Replace a user's role memberships by role name.
    pub fn set_role_names(&self, user_id: i64, role_names: &[&str]) {
        let role_ids: Vec<i64> = role_names
            .iter()
            .map(|name| self.seed_role(name, ""))
            .collect();

        let mut inner = self.lock();
        inner.user_roles.retain(|(uid, _)| *uid != user_id);
        for role_id in role_ids {
            inner.user_roles.push((user_id, role_id));
        }
    }

    /// Insert a profile for an existing user.
    pub fn add_profile(
        &self,
        user_id: i64,
        display_name: &str,
        preferred_language: &str,
        avatar_url: &str,
        bio: &str,
    ) -> i64 {
        let mut inner = self.lock();
        let profile_id = inner.next_profile_id;
        inner.next_profile_id += 1;
        inner.profiles.push(Profile {
            profile_id,
            user_id,
            display_name: display_name.to_string(),
            preferred_language: preferred_language.to_string(),
            avatar_url: avatar_url.to_string(),
            bio: bio.to_string(),
        });
        profile_id
    }

    /// Remove a user and everything hanging off it, as the cascading
    /// delete would.
    pub fn remove_user(&self, user_id: i64) {
        let mut inner = self.lock();
        inner.users.retain(|u| u.user_id != user_id);
        inner.user_roles.retain(|(uid, _)| *uid != user_id);
        inner.profiles.retain(|p| p.user_id != user_id);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, ApiError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        Ok(self.lock().users.iter().any(|u| u.email == email))
    }

    async fn exists(&self, user_id: i64) -> Result<bool, ApiError> {
        Ok(self.lock().users.iter().any(|u| u.user_id == user_id))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let user_id = inner.next_user_id;
        inner.next_user_id += 1;
        let user = User {
            user_id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            date_birth: new_user.date_birth,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), ApiError> {
        let mut inner = self.lock();
        if inner
            .users
            .iter()
            .any(|u| u.email == user.email && u.user_id != user.user_id)
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        if let Some(existing) = inner.users.iter_mut().find(|u| u.user_id == user.user_id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, user_id: i64) -> Result<(), ApiError> {
        self.remove_user(user_id);
        Ok(())
    }

    async fn roles_of(&self, user_id: i64) -> Result<Vec<Role>, ApiError> {
        let inner = self.lock();
        let mut roles: Vec<Role> = inner
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, rid)| inner.roles.iter().find(|r| r.role_id == *rid))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn set_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<(), ApiError> {
        let mut inner = self.lock();
        inner.user_roles.retain(|(uid, _)| *uid != user_id);
        for &role_id in role_ids {
            if !inner.user_roles.contains(&(user_id, role_id)) {
                inner.user_roles.push((user_id, role_id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_id(&self, role_id: i64) -> Result<Option<Role>, ApiError> {
        Ok(self
            .lock()
            .roles
            .iter()
            .find(|r| r.role_id == role_id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Role>, ApiError> {
        let mut roles = self.lock().roles.clone();
        roles.sort_by_key(|r| r.role_id);
        Ok(roles)
    }

    async fn name_exists(&self, name: &str) -> Result<bool, ApiError> {
        Ok(self
            .lock()
            .roles
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(name)))
    }

    async fn create(&self, name: &str, description: &str) -> Result<Role, ApiError> {
        let mut inner = self.lock();
        if inner.roles.iter().any(|r| r.name.eq_ignore_ascii_case(name)) {
            return Err(ApiError::Conflict(format!("Role already exists: {}", name)));
        }

        let role_id = inner.next_role_id;
        inner.next_role_id += 1;
        let role = Role {
            role_id,
            name: name.to_string(),
            description: description.to_string(),
        };
        inner.roles.push(role.clone());
        Ok(role)
    }

    async fn update(&self, role: &Role) -> Result<(), ApiError> {
        let mut inner = self.lock();
        if inner
            .roles
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(&role.name) && r.role_id != role.role_id)
        {
            return Err(ApiError::Conflict(format!(
                "Role already exists: {}",
                role.name
            )));
        }

        if let Some(existing) = inner.roles.iter_mut().find(|r| r.role_id == role.role_id) {
            *existing = role.clone();
        }
        Ok(())
    }

    async fn delete(&self, role_id: i64) -> Result<(), ApiError> {
        let mut inner = self.lock();
        if inner.user_roles.iter().any(|(_, rid)| *rid == role_id) {
            return Err(ApiError::Conflict(
                "Cannot delete role: still in use".to_string(),
            ));
        }
        inner.roles.retain(|r| r.role_id != role_id);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_id(&self, profile_id: i64) -> Result<Option<Profile>, ApiError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| p.profile_id == profile_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Option<Profile>, ApiError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn create(&self, new_profile: NewProfile) -> Result<Profile, ApiError> {
        let mut inner = self.lock();
        let profile_id = inner.next_profile_id;
        inner.next_profile_id += 1;
        let profile = Profile {
            profile_id,
            user_id: new_profile.user_id,
            display_name: new_profile.display_name,
            preferred_language: new_profile.preferred_language,
            avatar_url: new_profile.avatar_url,
            bio: new_profile.bio,
        };
        inner.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update(&self, profile: &Profile) -> Result<(), ApiError> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .profiles
            .iter_mut()
            .find(|p| p.profile_id == profile.profile_id)
        {
            *existing = profile.clone();
        }
        Ok(())
    }

    async fn delete(&self, profile_id: i64) -> Result<(), ApiError> {
        let mut inner = self.lock();
        inner.profiles.retain(|p| p.profile_id != profile_id);
        Ok(())
    }
}

/// Builds an [`AppState`] wired to a fresh [`MemoryStore`].
pub struct TestStateBuilder {
    ttl_seconds: i64,
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            ttl_seconds: DEFAULT_TEST_TTL_SECONDS,
        }
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn build(self) -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            TokenCodec::new(TEST_JWT_SECRET, self.ttl_seconds),
        );
        (state, store)
    }
}

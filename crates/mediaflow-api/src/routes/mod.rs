//! Route table.
//!
//! Three tiers: public (register, login, health), authenticated
//! (users, profiles), and admin (roles). The `authenticate` middleware
//! wraps everything so even public routes see a resolved principal when
//! a valid token happens to be present.

use crate::handlers::{auth_handler, profile_handler, role_handler, user_handler};
use crate::middleware::{authenticate, require_admin, require_auth};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_routes(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/api/v1/users/me", get(user_handler::me))
        .route("/api/v1/users/:id", get(user_handler::get_user))
        .route(
            "/api/v1/users/update_account/:id",
            put(user_handler::update_user),
        )
        .route(
            "/api/v1/users/delete_account/:id",
            delete(user_handler::delete_user),
        )
        .route("/api/v1/profiles/me", get(profile_handler::my_profile))
        .route(
            "/api/v1/profiles/:id",
            get(profile_handler::get_profile)
                .put(profile_handler::update_profile)
                .delete(profile_handler::delete_profile),
        )
        .route_layer(middleware::from_fn(require_auth));

    let admin_routes = Router::new()
        .route(
            "/api/v1/roles",
            get(role_handler::list_roles).post(role_handler::create_role),
        )
        .route(
            "/api/v1/roles/:id",
            get(role_handler::get_role)
                .put(role_handler::update_role)
                .delete(role_handler::delete_role),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        // Public authentication endpoints
        .route("/api/v1/users/register", post(auth_handler::register))
        .route("/api/v1/users/login", post(auth_handler::login))
        // Health check
        .route("/health", get(health_check))
        .merge(user_routes)
        .merge(admin_routes)
        // Token resolution on every request, rejection only at the gates
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ))
        // Request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

//! HTTP handlers.

pub mod auth_handler;
pub mod profile_handler;
pub mod role_handler;
pub mod user_handler;

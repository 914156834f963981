//! Business logic layer.

pub mod access_control;
pub mod auth_service;
pub mod profile_service;
pub mod role_service;
pub mod user_service;

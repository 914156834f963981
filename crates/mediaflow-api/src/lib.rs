//! MediaFlow User API Library
//!
//! User-management backend with JWT bearer authentication: accounts,
//! roles, and profiles over Postgres.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Password hashing and the JWT token codec
//! - `errors` - Error types and their HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Token resolution and route gates
//! - `models` - Data models
//! - `repositories` - Database access layer
//! - `routes` - Route table
//! - `services` - Business logic layer
//! - `state` - Shared application state

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

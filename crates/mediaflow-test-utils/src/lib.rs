//! # MediaFlow Test Utilities
//!
//! Shared test utilities for the MediaFlow User API.
//!
//! This crate provides:
//! - An in-memory storage backend implementing the store traits
//! - A state builder for service-level unit tests
//! - An HTTP test harness driving the full router in-process
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mediaflow_test_utils::{TestApp, TestStateBuilder};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let app = TestApp::new();
//!     let user_id = app.store.add_user("alice@example.com", "pw123", &["VIEWER"]);
//!     let token = app.token_for("alice@example.com", user_id);
//!
//!     let (status, body) = app.get("/api/v1/users/me", Some(&token)).await;
//!     assert_eq!(status, 200);
//! }
//! ```

pub mod harness;
pub mod memory;

pub use harness::TestApp;
pub use memory::{MemoryStore, TestStateBuilder};

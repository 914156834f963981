//! In-process HTTP harness.
//!
//! Drives the real router through `tower::ServiceExt::oneshot`, so
//! integration tests exercise middleware ordering, extractors, and the
//! error bodies exactly as a network client would see them, without a
//! socket or a database.

use crate::memory::{MemoryStore, TestStateBuilder, TEST_JWT_SECRET};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mediaflow_api::crypto::TokenCodec;
use mediaflow_api::routes;
use tower::ServiceExt;

pub struct TestApp {
    router: Router,
    pub store: MemoryStore,
    pub tokens: TokenCodec,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let (state, store) = TestStateBuilder::new().build();
        let tokens = state.tokens.clone();
        let router = routes::build_routes(state);
        Self {
            router,
            store,
            tokens,
        }
    }

    /// Bearer token for an existing fixture user. Roles embedded in the
    /// token are irrelevant to authorization, which reads the store.
    pub fn token_for(&self, email: &str, user_id: i64) -> String {
        match self.tokens.issue(email, user_id, &[]) {
            Ok(token) => token,
            Err(e) => panic!("Failed to issue fixture token: {}", e),
        }
    }

    /// Token already expired at issue time.
    pub fn expired_token_for(&self, email: &str, user_id: i64) -> String {
        match self
            .tokens
            .issue_with_ttl(email, user_id, &[], chrono::Duration::seconds(-60))
        {
            Ok(token) => token,
            Err(e) => panic!("Failed to issue expired fixture token: {}", e),
        }
    }

    /// Token signed with a different secret.
    pub fn foreign_token_for(&self, email: &str, user_id: i64) -> String {
        let mut secret = TEST_JWT_SECRET.to_vec();
        secret.reverse();
        let codec = TokenCodec::new(&secret, 3600);
        match codec.issue(email, user_id, &[]) {
            Ok(token) => token,
            Err(e) => panic!("Failed to issue foreign fixture token: {}", e),
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Send one request and decode the JSON body (Null when empty).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => panic!("Failed to build test request: {}", e),
        };

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(e) => panic!("Request failed: {}", e),
        };

        let status = response.status();
        let bytes = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => panic!("Failed to read response body: {}", e),
        };
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }
}

//! End-to-end authentication flow: registration, login, and the 401
//! taxonomy on protected routes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Context;
use mediaflow_test_utils::TestApp;
use serde_json::json;

fn register_body(name: &str, email: &str) -> serde_json::Value {
    json!({
        "name": name,
        "email": email,
        "password": "secret-pw",
        "dateBirth": "1990-05-17"
    })
}

#[tokio::test]
async fn test_register_then_login_round_trip() -> anyhow::Result<()> {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/users/register",
            None,
            register_body("Alice", "alice@example.com"),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["roles"], json!(["VIEWER"]));
    assert_eq!(body["profile"]["preferredLanguage"], "es");

    let (status, body) = app
        .post(
            "/api/v1/users/login",
            None,
            json!({"email": "alice@example.com", "password": "secret-pw"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["roles"], json!(["VIEWER"]));

    let token = body["token"]
        .as_str()
        .context("Login response should carry a token")?
        .to_string();
    let (status, me) = app.get("/api/v1/users/me", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(me["email"], "alice@example.com");
    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.store.add_user("alice@example.com", "pw", &["VIEWER"]);

    let (status, body) = app
        .post(
            "/api/v1/users/register",
            None,
            register_body("Alice", "alice@example.com"),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_reserved_role_is_rejected() {
    let app = TestApp::new();
    let admin_role_id = app.store.role_id("ADMIN");

    let mut body = register_body("Mallory", "mallory@example.com");
    body["roles"] = json!([admin_role_id]);

    let (status, body) = app.post("/api/v1/users/register", None, body).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_wrong_password_is_401() {
    let app = TestApp::new();
    app.store.add_user("alice@example.com", "pw", &["VIEWER"]);

    let (status, body) = app
        .post(
            "/api/v1/users/login",
            None,
            json!({"email": "alice@example.com", "password": "nope"}),
        )
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_email_is_404() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/users/login",
            None,
            json!({"email": "ghost@example.com", "password": "pw"}),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_missing_token_yields_unauthenticated_with_path() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/users/me", None).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert_eq!(body["path"], "/api/v1/users/me");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_expired_token_yields_token_expired() {
    let app = TestApp::new();
    let user_id = app.store.add_user("alice@example.com", "pw", &["VIEWER"]);
    let token = app.expired_token_for("alice@example.com", user_id);

    let (status, body) = app.get("/api/v1/users/me", Some(&token)).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_foreign_signature_yields_token_invalid() {
    let app = TestApp::new();
    let user_id = app.store.add_user("alice@example.com", "pw", &["VIEWER"]);
    let token = app.foreign_token_for("alice@example.com", user_id);

    let (status, body) = app.get("/api/v1/users/me", Some(&token)).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_garbage_token_yields_token_malformed() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/users/me", Some("not-a-jwt")).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "TOKEN_MALFORMED");
}

#[tokio::test]
async fn test_token_for_deleted_user_is_unauthenticated() {
    let app = TestApp::new();
    let user_id = app.store.add_user("alice@example.com", "pw", &["VIEWER"]);
    let token = app.token_for("alice@example.com", user_id);

    app.store.remove_user(user_id);

    let (status, body) = app.get("/api/v1/users/me", Some(&token)).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, 200);
}

//! Service-level tests for role management.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mediaflow_api::errors::ApiError;
use mediaflow_api::models::RoleRequest;
use mediaflow_api::services::role_service::{create, delete, find, list, update};
use mediaflow_test_utils::TestStateBuilder;

fn role_request(name: &str, description: &str) -> RoleRequest {
    RoleRequest {
        name: name.to_string(),
        description: description.to_string(),
    }
}

#[tokio::test]
async fn test_list_returns_seeded_roles() {
    let (state, _store) = TestStateBuilder::new().build();

    let roles = list(&state).await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["VIEWER", "ADMIN", "MODERATOR"]);
}

#[tokio::test]
async fn test_create_uppercases_name() {
    let (state, _store) = TestStateBuilder::new().build();

    let role = create(&state, role_request("editor", "Can edit content"))
        .await
        .unwrap();
    assert_eq!(role.name, "EDITOR");
}

#[tokio::test]
async fn test_create_duplicate_name_conflicts_case_insensitively() {
    let (state, _store) = TestStateBuilder::new().build();

    let result = create(&state, role_request("viewer", "dup")).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_create_blank_name_rejected() {
    let (state, _store) = TestStateBuilder::new().build();

    let result = create(&state, role_request("   ", "blank")).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_update_missing_role_is_not_found() {
    let (state, _store) = TestStateBuilder::new().build();

    let result = update(&state, 9999, role_request("GHOST", "none")).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_update_keeps_own_name_without_conflict() {
    let (state, store) = TestStateBuilder::new().build();
    let viewer_id = store.role_id("VIEWER");

    let role = update(
        &state,
        viewer_id,
        role_request("VIEWER", "Updated description"),
    )
    .await
    .unwrap();
    assert_eq!(role.description, "Updated description");
}

#[tokio::test]
async fn test_update_to_taken_name_conflicts() {
    let (state, store) = TestStateBuilder::new().build();
    let viewer_id = store.role_id("VIEWER");

    let result = update(&state, viewer_id, role_request("admin", "takeover")).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_delete_role_in_use_conflicts() {
    let (state, store) = TestStateBuilder::new().build();
    store.add_user("alice@example.com", "pw123", &["VIEWER"]);

    let result = delete(&state, store.role_id("VIEWER")).await;
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_delete_unused_role_succeeds() {
    let (state, _store) = TestStateBuilder::new().build();
    let role = create(&state, role_request("EDITOR", "temp")).await.unwrap();

    delete(&state, role.role_id).await.unwrap();
    assert!(matches!(
        find(&state, role.role_id).await,
        Err(ApiError::NotFound(_))
    ));
}

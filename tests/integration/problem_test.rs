//! Integration tests for problem proposal, lookup, and health endpoints.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_create_problem_starts_with_creator_vote() {
    let app = TestApp::new().await;
    let proposer = app.user("user");

    let response = app
        .request(
            "POST",
            "/problems",
            Some(json!({
                "title": "Invasive species spread",
                "description": "Tracking which invasive plants are spreading fastest",
            })),
            Some(&proposer.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["voteCount"], 1);
    assert_eq!(response.body["status"], "proposed");
    assert_eq!(response.body["moderationStatus"], "pending");
    assert_eq!(response.body["proposerId"], proposer.id.to_string());

    let id = response.body["id"].as_str().expect("id");
    let fetched = app
        .request("GET", &format!("/problems/{id}"), None, None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Invasive species spread");
}

#[tokio::test]
async fn test_create_problem_validation() {
    let app = TestApp::new().await;
    let proposer = app.user("user");

    let short_title = app
        .request(
            "POST",
            "/problems",
            Some(json!({ "title": "Hi", "description": "Long enough description" })),
            Some(&proposer.token),
        )
        .await;
    assert_eq!(short_title.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_title.body["error"], "VALIDATION");

    let missing_field = app
        .request(
            "POST",
            "/problems",
            Some(json!({ "title": "Only a title" })),
            Some(&proposer.token),
        )
        .await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_problem_requires_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/problems",
            Some(json!({
                "title": "Anonymous proposal",
                "description": "Should never be stored anywhere",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_problem_not_found() {
    let app = TestApp::new().await;

    let missing = app
        .request(
            "GET",
            &format!("/problems/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "NOT_FOUND");

    let milestones = app
        .request(
            "GET",
            &format!("/problems/{}/milestones", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(milestones.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_problem_has_no_milestones() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Noise pollution maps").await;

    let response = app
        .request("GET", &format!("/problems/{pid}/milestones"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let basic = app.request("GET", "/health", None, None).await;
    assert_eq!(basic.status, StatusCode::OK);
    assert_eq!(basic.body["status"], "ok");

    let detailed = app.request("GET", "/health/detailed", None, None).await;
    assert_eq!(detailed.status, StatusCode::OK);
    assert_eq!(detailed.body["storeBackend"], "memory");
    assert_eq!(detailed.body["storeHealthy"], true);
    assert_eq!(detailed.body["realtime"]["connections"], 0);
}

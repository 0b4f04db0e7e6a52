//! Integration tests for the vote → milestone → notification → workflow
//! pipeline.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{SseReader, TestApp};

/// Read vote updates until one carries `count`.
async fn wait_for_update(reader: &mut SseReader, count: i64) {
    loop {
        let (name, data) = reader.next_event().await;
        if name == "vote_update" && data["voteCount"] == count {
            return;
        }
    }
}

async fn notifications(app: &TestApp, token: &str) -> serde_json::Value {
    let response = app
        .request("GET", "/notifications?page=1&pageSize=50", None, Some(token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    response.body
}

#[tokio::test]
async fn test_fifty_votes_notify_proposer_once() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Wetland restoration").await;

    let (status, mut reader) = app.open_stream(&pid, None).await;
    assert_eq!(status, StatusCode::OK);

    let voters: Vec<_> = (0..49).map(|_| app.user("user")).collect();
    for voter in &voters {
        assert_eq!(app.toggle_vote(voter, &pid).await.status, StatusCode::OK);
    }
    // The broadcast runs after the milestone step of the same task.
    wait_for_update(&mut reader, 50).await;

    let milestones = app
        .request("GET", &format!("/problems/{pid}/milestones"), None, None)
        .await;
    assert_eq!(milestones.status, StatusCode::OK);
    let records = milestones.body.as_array().expect("milestone list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["threshold"], 50);
    assert_eq!(records[0]["notificationSent"], true);

    let inbox = notifications(&app, &proposer.token).await;
    assert_eq!(inbox["totalItems"], 1);
    assert_eq!(inbox["items"][0]["kind"], "milestone_reached");
    assert_eq!(inbox["items"][0]["payload"]["threshold"], 50);

    // Dropping back under and crossing again must not notify twice.
    app.toggle_vote(&voters[0], &pid).await;
    wait_for_update(&mut reader, 49).await;
    app.toggle_vote(&voters[0], &pid).await;
    wait_for_update(&mut reader, 50).await;

    let milestones = app
        .request("GET", &format!("/problems/{pid}/milestones"), None, None)
        .await;
    assert_eq!(milestones.body.as_array().map(Vec::len), Some(1));
    let inbox = notifications(&app, &proposer.token).await;
    assert_eq!(inbox["totalItems"], 1);
}

#[tokio::test]
async fn test_fifty_votes_advance_workflow() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Pollinator decline").await;

    for _ in 0..49 {
        let voter = app.user("user");
        app.toggle_vote(&voter, &pid).await;
    }

    let problem = app
        .poll_until(&format!("/problems/{pid}"), None, "status advance", |r| {
            r.body["status"] == "under_review"
        })
        .await;
    assert_eq!(problem.body["voteCount"], 50);
}

#[tokio::test]
async fn test_vote_milestone_endpoint_requires_admin() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Ocean acidification").await;

    let response = app
        .request(
            "POST",
            "/notifications/vote-milestone",
            Some(json!({ "problemId": pid, "newVoteCount": 50, "oldVoteCount": 49 })),
            Some(&proposer.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_vote_milestone_endpoint_alerts_admins_at_top_threshold() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let admin = app.user("admin");
    let pid = app.create_problem(&proposer, "Desertification fronts").await;
    // Writing once puts the admin into the identity mirror.
    app.create_problem(&admin, "Admin sandbox problem").await;

    let body = json!({ "problemId": pid, "newVoteCount": 100, "oldVoteCount": 0 });
    let first = app
        .request(
            "POST",
            "/notifications/vote-milestone",
            Some(body.clone()),
            Some(&admin.token),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["milestonesTriggered"], json!([50, 75, 100]));
    let results = first.body["results"].as_array().expect("results");
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r["outcome"] == "sent"));

    let admin_inbox = notifications(&app, &admin.token).await;
    assert_eq!(admin_inbox["totalItems"], 1);
    assert_eq!(admin_inbox["items"][0]["kind"], "admin_milestone_alert");
    let proposer_inbox = notifications(&app, &proposer.token).await;
    assert_eq!(proposer_inbox["totalItems"], 3);

    let again = app
        .request(
            "POST",
            "/notifications/vote-milestone",
            Some(body),
            Some(&admin.token),
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);
    let results = again.body["results"].as_array().expect("results");
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["outcome"] == "already_notified"));
    assert_eq!(notifications(&app, &proposer.token).await["totalItems"], 3);
}

#[tokio::test]
async fn test_vote_milestone_endpoint_validates_counts() {
    let app = TestApp::new().await;
    let admin = app.user("admin");

    let response = app
        .request(
            "POST",
            "/notifications/vote-milestone",
            Some(json!({
                "problemId": uuid::Uuid::new_v4(),
                "newVoteCount": -1,
                "oldVoteCount": 0,
            })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mark_notification_read() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let admin = app.user("admin");
    let other = app.user("user");
    let pid = app.create_problem(&proposer, "River sediment load").await;

    app.request(
        "POST",
        "/notifications/vote-milestone",
        Some(json!({ "problemId": pid, "newVoteCount": 50, "oldVoteCount": 49 })),
        Some(&admin.token),
    )
    .await;

    let inbox = notifications(&app, &proposer.token).await;
    let id = inbox["items"][0]["id"].as_str().expect("notification id").to_string();
    assert!(inbox["items"][0]["readAt"].is_null());

    let path = format!("/notifications/{id}/read");
    let foreign = app.request("PUT", &path, None, Some(&other.token)).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let read = app.request("PUT", &path, None, Some(&proposer.token)).await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["success"], true);

    let inbox = notifications(&app, &proposer.token).await;
    assert!(!inbox["items"][0]["readAt"].is_null());
}

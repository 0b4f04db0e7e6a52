//! Integration tests for the server-sent vote stream.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_stream_opens_with_connected_and_initial_counts() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let first = app.create_problem(&proposer, "Heat islands").await;
    let second = app.create_problem(&proposer, "Flood plains").await;
    let voter = app.user("user");
    app.toggle_vote(&voter, &second).await;

    let (status, mut reader) = app
        .open_stream(&format!("{first},not-an-id,{second}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (name, connected) = reader.next_event().await;
    assert_eq!(name, "connected");
    assert_eq!(connected["problemIds"], json!([first, second]));
    assert_eq!(connected["rejectedIds"], json!(["not-an-id"]));

    let (name, initial) = reader.next_event().await;
    assert_eq!(name, "initial_vote_count");
    assert_eq!(initial["problemId"], first);
    assert_eq!(initial["voteCount"], 1);

    let (name, initial) = reader.next_event().await;
    assert_eq!(name, "initial_vote_count");
    assert_eq!(initial["problemId"], second);
    assert_eq!(initial["voteCount"], 2);
}

#[tokio::test]
async fn test_vote_toggle_reaches_subscribers() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Seagrass meadows").await;
    let voter = app.user("user");

    let (_, mut reader) = app.open_stream(&pid, None).await;
    assert_eq!(reader.next_event().await.0, "connected");
    assert_eq!(reader.next_event().await.0, "initial_vote_count");

    app.toggle_vote(&voter, &pid).await;

    let (name, update) = reader.next_event().await;
    assert_eq!(name, "vote_update");
    assert_eq!(update["problemId"], pid);
    assert_eq!(update["voteCount"], 2);
    assert_eq!(update["hasVoted"], true);
    assert_eq!(update["userId"], voter.id.to_string());
}

#[tokio::test]
async fn test_unknown_problem_gets_no_initial_count() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let known = app.create_problem(&proposer, "Permafrost thaw").await;
    let unknown = uuid::Uuid::new_v4().to_string();

    let (_, mut reader) = app.open_stream(&format!("{unknown},{known}"), None).await;
    let (_, connected) = reader.next_event().await;
    assert_eq!(connected["problemIds"].as_array().map(Vec::len), Some(2));

    let (name, initial) = reader.next_event().await;
    assert_eq!(name, "initial_vote_count");
    assert_eq!(initial["problemId"], known);
}

#[tokio::test]
async fn test_stream_rejects_invalid_token() {
    let app = TestApp::new().await;
    let forged = helpers::forged_token();

    let (status, _) = app.open_stream("", Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stream_accepts_authenticated_caller() {
    let app = TestApp::new().await;
    let viewer = app.user("user");

    let (status, mut reader) = app.open_stream("", Some(&viewer.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (name, connected) = reader.next_event().await;
    assert_eq!(name, "connected");
    assert_eq!(connected["problemIds"], json!([]));
}

#[tokio::test]
async fn test_closed_stream_is_unregistered() {
    let app = TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Kelp forests").await;

    let (_, mut reader) = app.open_stream(&pid, None).await;
    reader.next_event().await;
    let stats = app.request("GET", "/health/detailed", None, None).await;
    assert_eq!(stats.body["realtime"]["connections"], 1);
    assert_eq!(stats.body["realtime"]["subscribedProblems"], 1);

    drop(reader);
    let stats = app.request("GET", "/health/detailed", None, None).await;
    assert_eq!(stats.body["realtime"]["connections"], 0);
    assert_eq!(stats.body["realtime"]["subscribedProblems"], 0);
}

#[tokio::test]
async fn test_admin_broadcast_endpoint() {
    let app = TestApp::new().await;
    let admin = app.user("admin");
    let user = app.user("user");
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Mangrove loss").await;

    let (_, mut reader) = app.open_stream(&pid, None).await;
    reader.next_event().await;
    reader.next_event().await;

    let body = json!({ "problemId": pid, "newVoteCount": 7, "hasVoted": false });

    let forbidden = app
        .request("POST", "/realtime/votes", Some(body.clone()), Some(&user.token))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let sent = app
        .request("POST", "/realtime/votes", Some(body), Some(&admin.token))
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.body["success"], true);
    assert_eq!(sent.body["broadcastTo"], 1);

    let (name, update) = reader.next_event().await;
    assert_eq!(name, "vote_update");
    assert_eq!(update["voteCount"], 7);
    assert_eq!(update["hasVoted"], false);
    assert!(update["userId"].is_null());
}

//! Integration tests for the vote toggle and vote status endpoints.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let app = helpers::TestApp::new().await;
    let proposer = app.user("user");
    let voter = app.user("user");
    let pid = app.create_problem(&proposer, "Microplastics in rivers").await;

    let added = app.toggle_vote(&voter, &pid).await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.body["action"], "added");
    assert_eq!(added.body["hasVoted"], true);
    assert_eq!(added.body["voteCount"], 2);

    let removed = app.toggle_vote(&voter, &pid).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["action"], "removed");
    assert_eq!(removed.body["hasVoted"], false);
    assert_eq!(removed.body["voteCount"], 1);
}

#[tokio::test]
async fn test_proposer_cannot_vote_on_own_problem() {
    let app = helpers::TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Soil carbon mapping").await;

    let response = app.toggle_vote(&proposer, &pid).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "RULE_VIOLATION");

    let problem = app
        .request("GET", &format!("/problems/{pid}"), None, None)
        .await;
    assert_eq!(problem.body["voteCount"], 1);
}

#[tokio::test]
async fn test_vote_status_reports_vote_type() {
    let app = helpers::TestApp::new().await;
    let proposer = app.user("user");
    let voter = app.user("user");
    let stranger = app.user("user");
    let pid = app.create_problem(&proposer, "Glacier retreat data").await;
    app.toggle_vote(&voter, &pid).await;

    let path = format!("/problems/{pid}/vote");

    let own = app.request("GET", &path, None, Some(&proposer.token)).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["hasVoted"], true);
    assert_eq!(own.body["voteType"], "creator_interest");

    let community = app.request("GET", &path, None, Some(&voter.token)).await;
    assert_eq!(community.body["hasVoted"], true);
    assert_eq!(community.body["voteType"], "community");

    let none = app.request("GET", &path, None, Some(&stranger.token)).await;
    assert_eq!(none.body["hasVoted"], false);
    assert!(none.body["voteType"].is_null());
}

#[tokio::test]
async fn test_vote_requires_authentication() {
    let app = helpers::TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Urban tree canopy").await;
    let path = format!("/problems/{pid}/vote");

    let anonymous = app.request("POST", &path, None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forged = helpers::forged_token();
    let rejected = app.request("POST", &path, None, Some(&forged)).await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.body["error"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_vote_on_unknown_or_inactive_problem() {
    let app = helpers::TestApp::new().await;
    let proposer = app.user("user");
    let voter = app.user("user");

    let missing = app
        .toggle_vote(&voter, &uuid::Uuid::new_v4().to_string())
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let malformed = app.toggle_vote(&voter, "not-an-id").await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    let pid = app.create_problem(&proposer, "Coral bleaching").await;
    let id = pid.parse().expect("problem id");
    app.memory.set_active(id, false).await.expect("deactivate");
    let inactive = app.toggle_vote(&voter, &pid).await;
    assert_eq!(inactive.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_count_matches_vote_rows() {
    let app = helpers::TestApp::new().await;
    let proposer = app.user("user");
    let pid = app.create_problem(&proposer, "Air quality sensors").await;

    let voters: Vec<_> = (0..5).map(|_| app.user("user")).collect();
    for voter in &voters {
        assert_eq!(app.toggle_vote(voter, &pid).await.status, StatusCode::OK);
    }
    app.toggle_vote(&voters[0], &pid).await;
    app.toggle_vote(&voters[1], &pid).await;

    let problem = app
        .request("GET", &format!("/problems/{pid}"), None, None)
        .await;
    // Creator interest plus three remaining community votes.
    assert_eq!(problem.body["voteCount"], 4);
}

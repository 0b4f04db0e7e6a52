//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tokio::sync::watch;
use tower::ServiceExt;
use uuid::Uuid;

use wikigaia_api::{AppState, build_app, build_components};
use wikigaia_core::config::{AppConfig, DatabaseBackend};
use wikigaia_core::types::UserId;
use wikigaia_database::{MemoryStore, Stores};

const TEST_SECRET: &str = "integration-test-secret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Handler state, for reaching the broadcaster directly
    pub state: AppState,
    /// The backing store
    pub memory: Arc<MemoryStore>,
    shutdown: watch::Sender<bool>,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store with the
    /// worker running.
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Memory;
        config.auth.jwt_secret = TEST_SECRET.to_string();
        config.worker.concurrency = 1;

        let memory = MemoryStore::shared();
        let components = build_components(config, Stores::memory(memory.clone()));
        let (shutdown, shutdown_rx) = watch::channel(false);
        if let Some(runner) = components.runner {
            tokio::spawn(runner.run(shutdown_rx));
        }

        let state = components.state;
        let router = build_app(state.clone());

        Self {
            router,
            state,
            memory,
            shutdown,
        }
    }

    /// Mint an identity token for a fresh user with the given role.
    pub fn user(&self, role: &str) -> TestUser {
        let id = UserId::from_uuid(Uuid::new_v4());
        let token = mint_token(id, role, TEST_SECRET, 3600);
        TestUser { id, token }
    }

    /// Propose a problem as `user` and return its id.
    pub async fn create_problem(&self, user: &TestUser, title: &str) -> String {
        let response = self
            .request(
                "POST",
                "/problems",
                Some(serde_json::json!({
                    "title": title,
                    "description": "A description long enough to pass validation",
                })),
                Some(&user.token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );
        response.body["id"]
            .as_str()
            .expect("No id in create response")
            .to_string()
    }

    /// Toggle `user`'s vote on a problem.
    pub async fn toggle_vote(&self, user: &TestUser, problem_id: &str) -> TestResponse {
        self.request(
            "POST",
            &format!("/problems/{problem_id}/vote"),
            None,
            Some(&user.token),
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(build_request(method, path, body, token))
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Open the vote stream and return its status and event reader.
    pub async fn open_stream(&self, problem_ids: &str, token: Option<&str>) -> (StatusCode, SseReader) {
        let path = format!("/realtime/votes?problemIds={problem_ids}");
        let response = self
            .router
            .clone()
            .oneshot(build_request("GET", &path, None, token))
            .await
            .expect("Failed to open stream");
        let status = response.status();
        (
            status,
            SseReader {
                stream: response.into_body().into_data_stream(),
                buffer: String::new(),
            },
        )
    }

    /// Repeat a GET until `done` accepts the response, failing after five
    /// seconds. Worker effects land asynchronously.
    pub async fn poll_until<F>(
        &self,
        path: &str,
        token: Option<&str>,
        what: &str,
        done: F,
    ) -> TestResponse
    where
        F: Fn(&TestResponse) -> bool,
    {
        let poll = async {
            loop {
                let response = self.request("GET", path, None, token).await;
                if done(&response) {
                    return response;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), poll)
            .await
            .unwrap_or_else(|_| panic!("Timed out waiting for {what}"))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// A caller with a valid identity token.
#[derive(Debug, Clone)]
pub struct TestUser {
    /// Subject of the token
    pub id: UserId,
    /// Bearer token
    pub token: String,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Reads server-sent events off a streaming response body.
pub struct SseReader {
    stream: BodyDataStream,
    buffer: String,
}

impl SseReader {
    /// Next named event and its JSON data; keep-alive comments are skipped.
    pub async fn next_event(&mut self) -> (String, Value) {
        tokio::time::timeout(Duration::from_secs(5), self.read_event())
            .await
            .expect("Timed out waiting for a stream event")
    }

    async fn read_event(&mut self) -> (String, Value) {
        loop {
            while let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                if let Some(event) = parse_block(&block) {
                    return event;
                }
            }
            let chunk = self
                .stream
                .next()
                .await
                .expect("Stream ended")
                .expect("Stream error");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}

fn parse_block(block: &str) -> Option<(String, Value)> {
    let mut name = None;
    let mut data = String::new();
    for line in block.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push_str(value.trim_start());
        }
    }
    let name = name?;
    let data = serde_json::from_str(&data).expect("Event data is not JSON");
    Some((name, data))
}

fn build_request(method: &str, path: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let body_str = body
        .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
        .unwrap_or_default();

    let mut req = Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        req = req.header("Authorization", format!("Bearer {}", token));
    }

    req.body(Body::from(body_str))
        .expect("Failed to build request")
}

/// Sign an HS256 identity token the way the identity provider does.
pub fn mint_token(user_id: UserId, role: &str, secret: &str, ttl_seconds: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = serde_json::json!({
        "sub": user_id.to_string(),
        "email": format!("{}@example.org", user_id),
        "user_role": role,
        "iat": now,
        "exp": now + ttl_seconds,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// Sign a token with the wrong key.
pub fn forged_token() -> String {
    mint_token(UserId::new(), "admin", "not-the-secret", 3600)
}

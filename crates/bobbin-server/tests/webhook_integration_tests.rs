// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the webhook ingestion pipeline.
//!
//! Tests cover:
//! - Signature verification (valid, invalid, missing)
//! - Repository lookup semantics (unknown, disabled)
//! - Event persistence and queue dispatch
//! - Retry status endpoint
//! - Password reset flow end to end

use std::time::Duration;

use axum::{
	body::Body,
	http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use async_trait::async_trait;
use bobbin_common_webhook::compute_signature;
use bobbin_queue::{
	MessageRetryHandler, QueueDispatcher, QueueError, QueueMessage, QueueTransport, RetryConfig,
};
use bobbin_server::api::{create_app_state, create_router, AppState};
use bobbin_server::ServerConfig;
use bobbin_server_auth::{verify_password, ResetTokenManager};
use bobbin_server_db::{NewRepository, RepoStore, ResetTokenStore, UserStore};

async fn setup_test_app() -> (axum::Router, AppState) {
	let pool = bobbin_server_db::testing::create_test_pool().await;
	let config = ServerConfig::default();
	let state = create_app_state(pool, &config).await.unwrap();
	(create_router(state.clone()), state)
}

/// Transport whose sends always fail, for exercising the degraded path.
struct UnreachableTransport;

#[async_trait]
impl QueueTransport for UnreachableTransport {
	async fn send(&self, _body: &str) -> Result<(), QueueError> {
		Err(QueueError::Transport("queue unreachable".to_string()))
	}

	async fn receive(
		&self,
		_max_messages: usize,
		_wait: Duration,
	) -> Result<Vec<QueueMessage>, QueueError> {
		Ok(Vec::new())
	}

	async fn delete(&self, _receipt_handle: &str) -> Result<(), QueueError> {
		Ok(())
	}
}

/// Build an app over a transport that cannot deliver. Long retry delays
/// keep the failed message visible to the status endpoint.
async fn setup_unreachable_queue_app() -> (axum::Router, AppState) {
	let pool = bobbin_server_db::testing::create_test_pool().await;
	let transport: std::sync::Arc<dyn QueueTransport> = std::sync::Arc::new(UnreachableTransport);
	let retry = MessageRetryHandler::new(
		transport.clone(),
		RetryConfig {
			base_delay: Duration::from_secs(60),
			max_delay: Duration::from_secs(60),
			..RetryConfig::default()
		},
	);
	let users = UserStore::new(pool.clone());
	let state = AppState {
		repos: RepoStore::new(pool.clone()),
		users: users.clone(),
		dispatcher: QueueDispatcher::new(transport.clone(), retry.clone()),
		retry,
		reset: ResetTokenManager::new(ResetTokenStore::new(pool.clone()), users),
		smtp: None,
		transport,
		base_url: "http://localhost:3000".to_string(),
	};
	(create_router(state.clone()), state)
}

/// Seed a user and a repository with webhooks enabled under `secret`.
async fn seed_repository(state: &AppState, secret: &str) -> i64 {
	let user_id = state.users.create_user("octocat", "hash").await.unwrap();
	let repo_id = state
		.repos
		.create_repository(&NewRepository {
			user_id,
			name: "hello",
			full_name: "octocat/hello",
			description: None,
			url: "https://github.com/octocat/hello",
			stars: 0,
			is_private: false,
		})
		.await
		.unwrap();
	state
		.repos
		.update_webhook_settings(repo_id, Some(secret), true)
		.await
		.unwrap();
	repo_id
}

fn webhook_request(repo_id: i64, body: &str, signature: Option<&str>, event: &str) -> Request<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri(format!("/api/webhook/{repo_id}"))
		.header("content-type", "application/json")
		.header("x-github-event", event);
	if let Some(signature) = signature {
		builder = builder.header("x-hub-signature-256", signature);
	}
	builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
	let bytes = response.into_body().collect().await.unwrap().to_bytes();
	serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_valid_webhook_is_accepted_and_dispatched() {
	let (app, state) = setup_test_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;

	let payload = json!({
		"sender": {"login": "octocat"},
		"ref": "refs/heads/main"
	})
	.to_string();
	let signature = compute_signature(b"s3cret", payload.as_bytes());

	let response = app
		.oneshot(webhook_request(repo_id, &payload, Some(&signature), "push"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["received"], true);
	assert_eq!(body["notified"], true);

	// The formatted message landed on the queue.
	let messages = state
		.transport
		.receive(10, Duration::from_millis(50))
		.await
		.unwrap();
	assert_eq!(messages.len(), 1);
	let envelope: Value = serde_json::from_str(&messages[0].body).unwrap();
	assert_eq!(envelope["event"], "push");
	assert_eq!(envelope["message"], "New push to octocat/hello by octocat");
	assert_eq!(envelope["repository"]["fullName"], "octocat/hello");

	// And the event was persisted.
	let events = state.repos.get_webhook_events(repo_id, 10).await.unwrap();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].event_type, "push");
	assert_eq!(events[0].sender.as_deref(), Some("octocat"));
}

#[tokio::test]
async fn test_invalid_signature_is_rejected() {
	let (app, state) = setup_test_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;

	let payload = json!({"sender": {"login": "octocat"}}).to_string();
	let signature = compute_signature(b"wrong-secret", payload.as_bytes());

	let response = app
		.oneshot(webhook_request(repo_id, &payload, Some(&signature), "push"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	let body = body_json(response).await;
	assert_eq!(body["error"], "invalid_signature");

	// Nothing persisted, nothing queued.
	assert!(state
		.repos
		.get_webhook_events(repo_id, 10)
		.await
		.unwrap()
		.is_empty());
	assert!(state
		.transport
		.receive(10, Duration::from_millis(20))
		.await
		.unwrap()
		.is_empty());
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
	let (app, state) = setup_test_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;

	let response = app
		.oneshot(webhook_request(repo_id, "{}", None, "push"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_repository_returns_404() {
	let (app, _state) = setup_test_app().await;

	let payload = "{}";
	let signature = compute_signature(b"s3cret", payload.as_bytes());
	let response = app
		.oneshot(webhook_request(999, payload, Some(&signature), "push"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disabled_webhook_returns_404() {
	let (app, state) = setup_test_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;
	state
		.repos
		.update_webhook_settings(repo_id, Some("s3cret"), false)
		.await
		.unwrap();

	let payload = "{}";
	let signature = compute_signature(b"s3cret", payload.as_bytes());
	let response = app
		.oneshot(webhook_request(repo_id, payload, Some(&signature), "push"))
		.await
		.unwrap();

	// Same status as unknown so callers cannot probe repository existence.
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unrecognized_event_is_stored_but_not_dispatched() {
	let (app, state) = setup_test_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;

	let payload = json!({"zen": "Design for failure."}).to_string();
	let signature = compute_signature(b"s3cret", payload.as_bytes());
	let response = app
		.oneshot(webhook_request(repo_id, &payload, Some(&signature), "ping"))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["received"], true);
	assert_eq!(body["notified"], false);

	let events = state.repos.get_webhook_events(repo_id, 10).await.unwrap();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].event_type, "ping");
}

#[tokio::test]
async fn test_dispatch_failure_still_answers_200_and_queues_retry() {
	let (app, state) = setup_unreachable_queue_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;

	let payload = json!({
		"sender": {"login": "octocat"},
		"ref": "refs/heads/main"
	})
	.to_string();
	let signature = compute_signature(b"s3cret", payload.as_bytes());

	let response = app
		.clone()
		.oneshot(webhook_request(repo_id, &payload, Some(&signature), "push"))
		.await
		.unwrap();

	// The caller still gets a definitive 200; only `notified` degrades.
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["received"], true);
	assert_eq!(body["notified"], false);

	// The event was persisted despite the outage.
	let events = state.repos.get_webhook_events(repo_id, 10).await.unwrap();
	assert_eq!(events.len(), 1);

	// And the failed envelope is awaiting retry.
	let status_response = app
		.oneshot(
			Request::builder()
				.uri("/api/message-retry-status")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(status_response.status(), StatusCode::OK);
	let status = body_json(status_response).await;
	assert_eq!(status["queueSize"], 1);
	assert_eq!(status["messages"][0]["attempts"], 1);
}

#[tokio::test]
async fn test_retry_status_endpoint() {
	let (app, _state) = setup_test_app().await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/message-retry-status")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["queueSize"], 0);
	assert!(body["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_events_endpoint_returns_history() {
	let (app, state) = setup_test_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;
	state
		.repos
		.add_webhook_event(repo_id, "push", None, Some("octocat"), "{}")
		.await
		.unwrap();

	let response = app
		.oneshot(
			Request::builder()
				.uri(format!("/api/repositories/{repo_id}/events"))
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body.as_array().unwrap().len(), 1);
	assert_eq!(body[0]["eventType"], "push");
}

#[tokio::test]
async fn test_webhook_settings_require_secret_to_enable() {
	let (app, state) = setup_test_app().await;
	let repo_id = seed_repository(&state, "s3cret").await;

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(format!("/api/repositories/{repo_id}/webhook"))
				.header("content-type", "application/json")
				.body(Body::from(json!({"enabled": true}).to_string()))
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_password_is_generic_for_unknown_username() {
	let (app, _state) = setup_test_app().await;

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/forgot-password")
				.header("content-type", "application/json")
				.body(Body::from(json!({"username": "nobody"}).to_string()))
				.unwrap(),
		)
		.await
		.unwrap();

	// Same body regardless of whether the account exists.
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["success"], true);
	assert!(body["message"].as_str().unwrap().contains("If an account"));
}

#[tokio::test]
async fn test_reset_password_flow() {
	let (app, state) = setup_test_app().await;
	let user_id = state.users.create_user("octocat", "old-hash").await.unwrap();
	let token = state.reset.create_token(user_id).await.unwrap();

	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/reset-password")
				.header("content-type", "application/json")
				.body(Body::from(
					json!({
						"token": token,
						"newPassword": "brand new password",
						"confirmPassword": "brand new password"
					})
					.to_string(),
				))
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);

	let user = state.users.get_user(user_id).await.unwrap().unwrap();
	assert!(verify_password("brand new password", &user.password).unwrap());

	// The token is single-use.
	let replay = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/reset-password")
				.header("content-type", "application/json")
				.body(Body::from(
					json!({
						"token": token,
						"newPassword": "another password",
						"confirmPassword": "another password"
					})
					.to_string(),
				))
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_password_mismatch_is_rejected() {
	let (app, state) = setup_test_app().await;
	let user_id = state.users.create_user("octocat", "old-hash").await.unwrap();
	let token = state.reset.create_token(user_id).await.unwrap();

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/reset-password")
				.header("content-type", "application/json")
				.body(Body::from(
					json!({
						"token": token,
						"newPassword": "password one",
						"confirmPassword": "password two"
					})
					.to_string(),
				))
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body = body_json(response).await;
	assert_eq!(body["success"], false);
	assert_eq!(body["error"], "password_mismatch");
}

#[tokio::test]
async fn test_reset_password_invalid_token_is_rejected() {
	let (app, _state) = setup_test_app().await;

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/api/reset-password")
				.header("content-type", "application/json")
				.body(Body::from(
					json!({
						"token": "deadbeef",
						"newPassword": "brand new password",
						"confirmPassword": "brand new password"
					})
					.to_string(),
				))
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body = body_json(response).await;
	assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_health_endpoint() {
	let (app, _state) = setup_test_app().await;

	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["status"], "ok");
	assert_eq!(body["retry_queue_size"], 0);
}

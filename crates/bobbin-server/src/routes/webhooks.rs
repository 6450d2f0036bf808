// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Webhook ingestion and retry status handlers.
//!
//! Signature verification runs over the raw request bytes before any JSON
//! parsing. A repository that is unknown, has webhooks disabled, or has no
//! secret configured gets the same 404 so callers cannot probe which
//! repositories exist.

use axum::{
	body::Bytes,
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use bobbin_common_webhook::{verify_signature, EVENT_HEADER, SIGNATURE_HEADER};
use bobbin_notify::{format_message, QueueEnvelope, RepositoryEvent};
use bobbin_server_smtp::emails;

use crate::api::AppState;
use crate::api_response::{not_found, unauthorized, bad_request, internal_error};

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
	pub received: bool,
	pub notified: bool,
}

/// POST /api/webhook/{repository_id}
pub async fn receive_webhook(
	State(state): State<AppState>,
	Path(repository_id): Path<i64>,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let repository = match state.repos.get_repository(repository_id).await {
		Ok(repository) => repository,
		Err(e) => {
			tracing::error!(repository_id, error = %e, "repository lookup failed");
			return internal_error("failed to process webhook").into_response();
		}
	};

	let Some(repository) = repository else {
		return not_found("Repository not found").into_response();
	};
	if !repository.webhook_enabled {
		return not_found("Repository not found").into_response();
	}
	let Some(secret) = repository.webhook_secret.as_deref() else {
		return not_found("Repository not found").into_response();
	};

	let signature = headers
		.get(SIGNATURE_HEADER)
		.and_then(|v| v.to_str().ok());
	let Some(signature) = signature else {
		tracing::warn!(repository_id, "webhook rejected: missing signature header");
		return unauthorized("Invalid signature").into_response();
	};
	if !verify_signature(secret.as_bytes(), &body, signature) {
		tracing::warn!(repository_id, "webhook rejected: signature mismatch");
		return unauthorized("Invalid signature").into_response();
	}

	let payload: Value = match serde_json::from_slice(&body) {
		Ok(payload) => payload,
		Err(e) => {
			tracing::warn!(repository_id, error = %e, "webhook payload is not valid JSON");
			return bad_request("invalid_payload", "Request body must be JSON").into_response();
		}
	};

	let event_header = headers
		.get(EVENT_HEADER)
		.and_then(|v| v.to_str().ok())
		.unwrap_or("unknown");

	let action = payload
		.get("action")
		.and_then(Value::as_str)
		.map(str::to_string);
	let sender = payload
		.get("sender")
		.and_then(|s| s.get("login").or(Some(s)))
		.and_then(Value::as_str)
		.map(str::to_string);

	if let Err(e) = state
		.repos
		.add_webhook_event(
			repository_id,
			event_header,
			action.as_deref(),
			sender.as_deref(),
			&String::from_utf8_lossy(&body),
		)
		.await
	{
		tracing::error!(repository_id, error = %e, "failed to persist webhook event");
		return internal_error("failed to process webhook").into_response();
	}

	let Some(event) = RepositoryEvent::parse(event_header) else {
		tracing::warn!(repository_id, event = event_header, "unrecognized event type");
		return (
			StatusCode::OK,
			Json(WebhookResponse {
				received: true,
				notified: false,
			}),
		)
			.into_response();
	};

	let summary = repository.summary();

	// Overlay our repository summary and a flat sender on the payload so
	// template paths resolve regardless of the delivery's exact shape.
	let mut context = payload;
	if let Some(obj) = context.as_object_mut() {
		obj.insert(
			"repository".to_string(),
			json!({
				"name": summary.name,
				"fullName": summary.full_name,
				"url": summary.url,
			}),
		);
		if let Some(sender) = &sender {
			obj.insert("sender".to_string(), Value::String(sender.clone()));
		}
	}

	let envelope = QueueEnvelope {
		event,
		message: format_message(event, &context),
		timestamp: Utc::now(),
		repository: summary,
		sender,
		action,
		user: None,
	};

	let notified = match state.dispatcher.dispatch(&envelope).await {
		Ok(()) => true,
		Err(e) => {
			// Event is persisted and queued for retry; the webhook itself
			// succeeded from GitHub's point of view.
			tracing::error!(repository_id, error = %e, "notification dispatch failed");
			false
		}
	};

	// Email is its own best-effort channel; a queue outage must not
	// suppress it.
	send_owner_email(&state, &envelope).await;

	(
		StatusCode::OK,
		Json(WebhookResponse {
			received: true,
			notified,
		}),
	)
		.into_response()
}

/// Best-effort notification email to the repository owner. Owners whose
/// username is not an email address simply don't get one.
async fn send_owner_email(state: &AppState, envelope: &QueueEnvelope) {
	let Some(smtp) = &state.smtp else {
		return;
	};

	let owner = match state.repos.get_repository(envelope.repository.id).await {
		Ok(Some(repository)) => match state.users.get_user(repository.user_id).await {
			Ok(Some(user)) => user,
			_ => return,
		},
		_ => return,
	};

	if !bobbin_server_smtp::is_valid_email(&owner.username) {
		return;
	}

	let email = emails::notification_email(envelope);
	if let Err(e) = smtp
		.send_email(&owner.username, &email.subject, &email.html, &email.text)
		.await
	{
		tracing::warn!(user_id = owner.id, error = %e, "notification email failed");
	}
}

/// GET /api/message-retry-status
pub async fn retry_status(State(state): State<AppState>) -> impl IntoResponse {
	Json(state.retry.status().await)
}

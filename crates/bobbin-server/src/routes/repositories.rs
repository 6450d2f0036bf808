// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository webhook settings and event history handlers.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::api_response::{bad_request, internal_error, not_found};

#[derive(Debug, Deserialize)]
pub struct WebhookSettingsRequest {
	pub secret: Option<String>,
	pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct WebhookSettingsResponse {
	pub enabled: bool,
}

/// POST /api/repositories/{repository_id}/webhook
pub async fn update_webhook_settings(
	State(state): State<AppState>,
	Path(repository_id): Path<i64>,
	Json(request): Json<WebhookSettingsRequest>,
) -> Response {
	if request.enabled && request.secret.as_deref().is_none_or(str::is_empty) {
		return bad_request(
			"secret_required",
			"A webhook secret is required to enable webhooks",
		)
		.into_response();
	}

	match state
		.repos
		.update_webhook_settings(repository_id, request.secret.as_deref(), request.enabled)
		.await
	{
		Ok(true) => (
			StatusCode::OK,
			Json(WebhookSettingsResponse {
				enabled: request.enabled,
			}),
		)
			.into_response(),
		Ok(false) => not_found("Repository not found").into_response(),
		Err(e) => {
			tracing::error!(repository_id, error = %e, "failed to update webhook settings");
			internal_error("failed to update webhook settings").into_response()
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
	pub limit: Option<i64>,
}

/// GET /api/repositories/{repository_id}/events
pub async fn list_webhook_events(
	State(state): State<AppState>,
	Path(repository_id): Path<i64>,
	Query(query): Query<EventsQuery>,
) -> Response {
	let exists = match state.repos.get_repository(repository_id).await {
		Ok(repository) => repository.is_some(),
		Err(e) => {
			tracing::error!(repository_id, error = %e, "repository lookup failed");
			return internal_error("failed to list events").into_response();
		}
	};
	if !exists {
		return not_found("Repository not found").into_response();
	}

	let limit = query.limit.unwrap_or(50).clamp(1, 200);
	match state.repos.get_webhook_events(repository_id, limit).await {
		Ok(events) => (StatusCode::OK, Json(events)).into_response(),
		Err(e) => {
			tracing::error!(repository_id, error = %e, "failed to list webhook events");
			internal_error("failed to list events").into_response()
		}
	}
}

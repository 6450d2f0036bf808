// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health check handler.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub retry_queue_size: usize,
	pub smtp_configured: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let retry = state.retry.status().await;
	Json(HealthResponse {
		status: "ok",
		retry_queue_size: retry.queue_size,
		smtp_configured: state.smtp.is_some(),
	})
}

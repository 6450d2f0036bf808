// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API response helpers.
//!
//! Error bodies follow the `{error, message}` shape across all routes:
//! `error` is a stable machine-readable code, `message` is for humans.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub error: String,
	pub message: String,
}

pub fn error_response(
	status: StatusCode,
	error: &str,
	message: impl Into<String>,
) -> (StatusCode, Json<ErrorBody>) {
	(
		status,
		Json(ErrorBody {
			error: error.to_string(),
			message: message.into(),
		}),
	)
}

pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
	error_response(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn unauthorized(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
	error_response(StatusCode::UNAUTHORIZED, "invalid_signature", message)
}

pub fn bad_request(error: &str, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
	error_response(StatusCode::BAD_REQUEST, error, message)
}

pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
	error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
}

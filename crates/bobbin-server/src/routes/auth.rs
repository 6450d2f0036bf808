// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password reset handlers.
//!
//! Forgot-password always answers with the same generic success body so
//! the endpoint cannot be used to enumerate accounts.

use axum::{
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};

use bobbin_server_auth::hash_password;
use bobbin_server_smtp::emails;

use crate::api::AppState;
use crate::api_response::internal_error;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
	pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
	pub success: bool,
	pub message: &'static str,
}

const FORGOT_PASSWORD_MESSAGE: &str =
	"If an account exists for that username, a password reset link has been sent.";

/// POST /api/forgot-password
pub async fn forgot_password(
	State(state): State<AppState>,
	Json(request): Json<ForgotPasswordRequest>,
) -> Response {
	let generic = (
		StatusCode::OK,
		Json(ForgotPasswordResponse {
			success: true,
			message: FORGOT_PASSWORD_MESSAGE,
		}),
	);

	let user = match state.users.get_user_by_username(&request.username).await {
		Ok(user) => user,
		Err(e) => {
			// Still answer generically; the failure is ours, not the caller's.
			tracing::error!(error = %e, "user lookup failed during forgot-password");
			return generic.into_response();
		}
	};

	if let Some(user) = user {
		match state.reset.create_token(user.id).await {
			Ok(token) => send_reset_email(&state, &user.username, &token).await,
			Err(e) => {
				tracing::error!(user_id = user.id, error = %e, "failed to issue reset token");
			}
		}
	} else {
		tracing::debug!("forgot-password for unknown username");
	}

	generic.into_response()
}

async fn send_reset_email(state: &AppState, username: &str, token: &str) {
	let Some(smtp) = &state.smtp else {
		tracing::warn!("SMTP not configured, reset token issued but not emailed");
		return;
	};
	if !bobbin_server_smtp::is_valid_email(username) {
		tracing::warn!("username is not an email address, reset email skipped");
		return;
	}

	let reset_url = format!("{}/reset-password?token={}", state.base_url, token);
	let email = emails::password_reset_email(username, &reset_url);
	if let Err(e) = smtp
		.send_email(username, &email.subject, &email.html, &email.text)
		.await
	{
		tracing::error!(error = %e, "failed to send password reset email");
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
	pub token: String,
	pub new_password: String,
	pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
	pub success: bool,
	pub message: &'static str,
}

/// Failed resets keep the `{success, message}` wire shape and add a stable
/// machine-readable code alongside it.
#[derive(Debug, Serialize)]
struct ResetFailure {
	success: bool,
	error: &'static str,
	message: &'static str,
}

fn reset_failure(error: &'static str, message: &'static str) -> Response {
	(
		StatusCode::BAD_REQUEST,
		Json(ResetFailure {
			success: false,
			error,
			message,
		}),
	)
		.into_response()
}

/// POST /api/reset-password
pub async fn reset_password(
	State(state): State<AppState>,
	Json(request): Json<ResetPasswordRequest>,
) -> Response {
	if request.new_password != request.confirm_password {
		return reset_failure("password_mismatch", "Passwords do not match");
	}
	if request.new_password.len() < 8 {
		return reset_failure("password_too_short", "Password must be at least 8 characters");
	}

	let user = match state.reset.validate_token(&request.token).await {
		Ok(Some(user)) => user,
		Ok(None) => {
			return reset_failure("invalid_token", "Reset token is invalid or expired");
		}
		Err(e) => {
			tracing::error!(error = %e, "token validation failed");
			return internal_error("failed to reset password").into_response();
		}
	};

	let password_hash = match hash_password(&request.new_password) {
		Ok(hash) => hash,
		Err(e) => {
			tracing::error!(error = %e, "password hashing failed");
			return internal_error("failed to reset password").into_response();
		}
	};

	// Update the password before consuming the token: if the update fails
	// the token stays usable for another attempt.
	match state.users.update_password(user.id, &password_hash).await {
		Ok(true) => {}
		Ok(false) => {
			return reset_failure("invalid_token", "Reset token is invalid or expired");
		}
		Err(e) => {
			tracing::error!(user_id = user.id, error = %e, "password update failed");
			return internal_error("failed to reset password").into_response();
		}
	}

	if let Err(e) = state.reset.consume_token(&request.token).await {
		tracing::error!(user_id = user.id, error = %e, "failed to consume reset token");
	}

	tracing::info!(user_id = user.id, "password reset completed");
	(
		StatusCode::OK,
		Json(ResetPasswordResponse {
			success: true,
			message: "Password has been reset",
		}),
	)
		.into_response()
}

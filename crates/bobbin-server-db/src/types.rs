// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use bobbin_notify::RepositorySummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account row. `password` holds an Argon2 hash, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	pub id: i64,
	pub username: String,
	#[serde(skip_serializing)]
	pub password: String,
	pub created_at: DateTime<Utc>,
}

/// A tracked GitHub repository with its webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
	pub id: i64,
	pub user_id: i64,
	pub name: String,
	pub full_name: String,
	pub description: Option<String>,
	pub url: String,
	pub stars: i64,
	pub is_private: bool,
	/// Shared secret for signature verification. `None` means webhooks
	/// have never been configured for this repository.
	#[serde(skip_serializing)]
	pub webhook_secret: Option<String>,
	pub webhook_enabled: bool,
	pub created_at: DateTime<Utc>,
}

impl Repository {
	pub fn summary(&self) -> RepositorySummary {
		RepositorySummary {
			id: self.id,
			name: self.name.clone(),
			full_name: self.full_name.clone(),
			url: self.url.clone(),
		}
	}
}

/// A received webhook delivery, persisted before dispatch so the event
/// history survives queue outages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
	pub id: i64,
	pub repository_id: i64,
	pub event_type: String,
	pub action: Option<String>,
	pub sender: Option<String>,
	/// Raw JSON payload as delivered.
	pub payload: String,
	pub created_at: DateTime<Utc>,
}

/// Single-use password reset token. Consumed tokens are marked used and
/// kept for audit, never deleted.
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
	pub id: i64,
	pub user_id: i64,
	pub token: String,
	pub expires_at: DateTime<Utc>,
	pub used: bool,
	pub created_at: DateTime<Utc>,
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password reset token store.
//!
//! Tokens are single-use: consumed tokens flip `used` and stay in the
//! table for audit. Expiry is compared in Rust against the caller's
//! clock, not in SQL, so the comparison is testable with fixed times.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::PasswordResetToken;

#[derive(Clone)]
pub struct ResetTokenStore {
	pool: SqlitePool,
}

impl ResetTokenStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, token), fields(user_id))]
	pub async fn insert_token(
		&self,
		user_id: i64,
		token: &str,
		expires_at: DateTime<Utc>,
	) -> Result<i64, DbError> {
		let now = Utc::now();

		let result = sqlx::query(
			r#"
			INSERT INTO password_reset_tokens (user_id, token, expires_at, used, created_at)
			VALUES (?, ?, ?, 0, ?)
			"#,
		)
		.bind(user_id)
		.bind(token)
		.bind(expires_at.to_rfc3339())
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await?;

		let id = result.last_insert_rowid();
		tracing::debug!(user_id, token_id = id, "reset token created");
		Ok(id)
	}

	/// Look up a token that is unused and not expired as of `now`.
	#[tracing::instrument(skip(self, token))]
	pub async fn find_valid_token(
		&self,
		token: &str,
		now: DateTime<Utc>,
	) -> Result<Option<PasswordResetToken>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, token, expires_at, used, created_at
			FROM password_reset_tokens
			WHERE token = ? AND used = 0
			"#,
		)
		.bind(token)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};
		let token = parse_token_row(&row)?;
		if token.expires_at <= now {
			return Ok(None);
		}
		Ok(Some(token))
	}

	/// Mark a token used.
	///
	/// # Returns
	/// `false` if the token was already used or unknown, so races between
	/// two resets with the same token resolve to a single winner.
	#[tracing::instrument(skip(self), fields(token_id = id))]
	pub async fn mark_used(&self, id: i64) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE password_reset_tokens
			SET used = 1
			WHERE id = ? AND used = 0
			"#,
		)
		.bind(id)
		.execute(&self.pool)
		.await?;

		let consumed = result.rows_affected() > 0;
		if consumed {
			tracing::info!(token_id = id, "reset token consumed");
		}
		Ok(consumed)
	}
}

fn parse_token_row(row: &sqlx::sqlite::SqliteRow) -> Result<PasswordResetToken, DbError> {
	let expires_at_str: String = row.get("expires_at");
	let created_at_str: String = row.get("created_at");

	let expires_at = DateTime::parse_from_rfc3339(&expires_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid expires_at: {e}")))?
		.with_timezone(&Utc);
	let created_at = DateTime::parse_from_rfc3339(&created_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
		.with_timezone(&Utc);

	Ok(PasswordResetToken {
		id: row.get("id"),
		user_id: row.get("user_id"),
		token: row.get("token"),
		expires_at,
		used: row.get("used"),
		created_at,
	})
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User store for database operations.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::User;

/// Store for user accounts. Passwords arrive already hashed; this layer
/// never sees plaintext.
#[derive(Clone)]
pub struct UserStore {
	pool: SqlitePool,
}

impl UserStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a user.
	///
	/// # Arguments
	/// * `username` - Unique login name
	/// * `password_hash` - Argon2 hash of the password
	///
	/// # Returns
	/// The generated user id.
	#[tracing::instrument(skip(self, password_hash), fields(username = %username))]
	pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, DbError> {
		let now = Utc::now();

		let result = sqlx::query(
			r#"
			INSERT INTO users (username, password, created_at)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(username)
		.bind(password_hash)
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref db) if db.is_unique_violation() => {
				DbError::Conflict(format!("username already taken: {username}"))
			}
			other => DbError::Sqlx(other),
		})?;

		let id = result.last_insert_rowid();
		tracing::debug!(user_id = id, "user created");
		Ok(id)
	}

	#[tracing::instrument(skip(self), fields(user_id = id))]
	pub async fn get_user(&self, id: i64) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, password, created_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(parse_user_row(&row)?)),
			None => Ok(None),
		}
	}

	#[tracing::instrument(skip(self), fields(username = %username))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, password, created_at
			FROM users
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(parse_user_row(&row)?)),
			None => Ok(None),
		}
	}

	/// Replace a user's password hash.
	///
	/// # Returns
	/// `true` if the user existed and was updated.
	#[tracing::instrument(skip(self, password_hash), fields(user_id = id))]
	pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE users
			SET password = ?
			WHERE id = ?
			"#,
		)
		.bind(password_hash)
		.bind(id)
		.execute(&self.pool)
		.await?;

		let updated = result.rows_affected() > 0;
		if updated {
			tracing::info!(user_id = id, "password updated");
		}
		Ok(updated)
	}
}

fn parse_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let created_at_str: String = row.get("created_at");
	let created_at = DateTime::parse_from_rfc3339(&created_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
		.with_timezone(&Utc);

	Ok(User {
		id: row.get("id"),
		username: row.get("username"),
		password: row.get("password"),
		created_at,
	})
}

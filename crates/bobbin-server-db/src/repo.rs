// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository store for database operations.
//!
//! Covers the tracked repositories themselves, their webhook delivery
//! settings, and the persisted webhook event history.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::{Repository, WebhookEvent};

/// Fields for creating a repository record.
#[derive(Debug, Clone)]
pub struct NewRepository<'a> {
	pub user_id: i64,
	pub name: &'a str,
	pub full_name: &'a str,
	pub description: Option<&'a str>,
	pub url: &'a str,
	pub stars: i64,
	pub is_private: bool,
}

#[derive(Clone)]
pub struct RepoStore {
	pool: SqlitePool,
}

impl RepoStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a repository. Webhooks start disabled with no secret.
	#[tracing::instrument(skip(self, repo), fields(full_name = %repo.full_name, user_id = repo.user_id))]
	pub async fn create_repository(&self, repo: &NewRepository<'_>) -> Result<i64, DbError> {
		let now = Utc::now();

		let result = sqlx::query(
			r#"
			INSERT INTO repositories (
				user_id, name, full_name, description, url, stars, is_private,
				webhook_secret, webhook_enabled, created_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, NULL, 0, ?)
			"#,
		)
		.bind(repo.user_id)
		.bind(repo.name)
		.bind(repo.full_name)
		.bind(repo.description)
		.bind(repo.url)
		.bind(repo.stars)
		.bind(repo.is_private)
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await?;

		let id = result.last_insert_rowid();
		tracing::debug!(repository_id = id, "repository created");
		Ok(id)
	}

	#[tracing::instrument(skip(self), fields(repository_id = id))]
	pub async fn get_repository(&self, id: i64) -> Result<Option<Repository>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, name, full_name, description, url, stars,
			       is_private, webhook_secret, webhook_enabled, created_at
			FROM repositories
			WHERE id = ?
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => Ok(Some(parse_repository_row(&row)?)),
			None => Ok(None),
		}
	}

	/// List a user's repositories ordered by creation date descending.
	#[tracing::instrument(skip(self), fields(user_id))]
	pub async fn list_repositories_for_user(&self, user_id: i64) -> Result<Vec<Repository>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, user_id, name, full_name, description, url, stars,
			       is_private, webhook_secret, webhook_enabled, created_at
			FROM repositories
			WHERE user_id = ?
			ORDER BY created_at DESC
			"#,
		)
		.bind(user_id)
		.fetch_all(&self.pool)
		.await?;

		let mut repositories = Vec::with_capacity(rows.len());
		for row in rows {
			repositories.push(parse_repository_row(&row)?);
		}
		Ok(repositories)
	}

	/// Set the webhook secret and enabled flag for a repository.
	///
	/// # Returns
	/// `true` if the repository existed and was updated.
	#[tracing::instrument(skip(self, secret), fields(repository_id = id, enabled))]
	pub async fn update_webhook_settings(
		&self,
		id: i64,
		secret: Option<&str>,
		enabled: bool,
	) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE repositories
			SET webhook_secret = ?, webhook_enabled = ?
			WHERE id = ?
			"#,
		)
		.bind(secret)
		.bind(enabled)
		.bind(id)
		.execute(&self.pool)
		.await?;

		let updated = result.rows_affected() > 0;
		if updated {
			tracing::info!(repository_id = id, enabled, "webhook settings updated");
		}
		Ok(updated)
	}

	/// Persist a received webhook delivery.
	#[tracing::instrument(skip(self, payload), fields(repository_id, event_type = %event_type))]
	pub async fn add_webhook_event(
		&self,
		repository_id: i64,
		event_type: &str,
		action: Option<&str>,
		sender: Option<&str>,
		payload: &str,
	) -> Result<i64, DbError> {
		let now = Utc::now();

		let result = sqlx::query(
			r#"
			INSERT INTO webhook_events (repository_id, event_type, action, sender, payload, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(repository_id)
		.bind(event_type)
		.bind(action)
		.bind(sender)
		.bind(payload)
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await?;

		let id = result.last_insert_rowid();
		tracing::debug!(event_id = id, "webhook event recorded");
		Ok(id)
	}

	/// Recent webhook events for a repository, newest first.
	#[tracing::instrument(skip(self), fields(repository_id, limit))]
	pub async fn get_webhook_events(
		&self,
		repository_id: i64,
		limit: i64,
	) -> Result<Vec<WebhookEvent>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, repository_id, event_type, action, sender, payload, created_at
			FROM webhook_events
			WHERE repository_id = ?
			ORDER BY created_at DESC, id DESC
			LIMIT ?
			"#,
		)
		.bind(repository_id)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?;

		let mut events = Vec::with_capacity(rows.len());
		for row in rows {
			events.push(parse_webhook_event_row(&row)?);
		}
		Ok(events)
	}
}

fn parse_repository_row(row: &sqlx::sqlite::SqliteRow) -> Result<Repository, DbError> {
	let created_at_str: String = row.get("created_at");
	let created_at = DateTime::parse_from_rfc3339(&created_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
		.with_timezone(&Utc);

	Ok(Repository {
		id: row.get("id"),
		user_id: row.get("user_id"),
		name: row.get("name"),
		full_name: row.get("full_name"),
		description: row.get("description"),
		url: row.get("url"),
		stars: row.get("stars"),
		is_private: row.get("is_private"),
		webhook_secret: row.get("webhook_secret"),
		webhook_enabled: row.get("webhook_enabled"),
		created_at,
	})
}

fn parse_webhook_event_row(row: &sqlx::sqlite::SqliteRow) -> Result<WebhookEvent, DbError> {
	let created_at_str: String = row.get("created_at");
	let created_at = DateTime::parse_from_rfc3339(&created_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
		.with_timezone(&Utc);

	Ok(WebhookEvent {
		id: row.get("id"),
		repository_id: row.get("repository_id"),
		event_type: row.get("event_type"),
		action: row.get("action"),
		sender: row.get("sender"),
		payload: row.get("payload"),
		created_at,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;
	use crate::user::UserStore;

	async fn make_stores() -> (RepoStore, i64) {
		let pool = create_test_pool().await;
		let users = UserStore::new(pool.clone());
		let user_id = users.create_user("octocat", "hash").await.unwrap();
		(RepoStore::new(pool), user_id)
	}

	fn new_repo(user_id: i64) -> NewRepository<'static> {
		NewRepository {
			user_id,
			name: "hello",
			full_name: "octocat/hello",
			description: Some("demo"),
			url: "https://github.com/octocat/hello",
			stars: 3,
			is_private: false,
		}
	}

	#[tokio::test]
	async fn test_create_and_get_repository() {
		let (store, user_id) = make_stores().await;

		let id = store.create_repository(&new_repo(user_id)).await.unwrap();

		let repo = store.get_repository(id).await.unwrap().unwrap();
		assert_eq!(repo.full_name, "octocat/hello");
		assert_eq!(repo.stars, 3);
		assert!(!repo.webhook_enabled);
		assert!(repo.webhook_secret.is_none());
	}

	#[tokio::test]
	async fn test_get_repository_not_found() {
		let (store, _) = make_stores().await;
		assert!(store.get_repository(404).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_update_webhook_settings() {
		let (store, user_id) = make_stores().await;
		let id = store.create_repository(&new_repo(user_id)).await.unwrap();

		assert!(store
			.update_webhook_settings(id, Some("s3cret"), true)
			.await
			.unwrap());

		let repo = store.get_repository(id).await.unwrap().unwrap();
		assert!(repo.webhook_enabled);
		assert_eq!(repo.webhook_secret.as_deref(), Some("s3cret"));

		// Disabling keeps the secret out of play without deleting it.
		assert!(store
			.update_webhook_settings(id, Some("s3cret"), false)
			.await
			.unwrap());
		let repo = store.get_repository(id).await.unwrap().unwrap();
		assert!(!repo.webhook_enabled);
	}

	#[tokio::test]
	async fn test_webhook_event_history_newest_first() {
		let (store, user_id) = make_stores().await;
		let id = store.create_repository(&new_repo(user_id)).await.unwrap();

		store
			.add_webhook_event(id, "push", None, Some("octocat"), "{}")
			.await
			.unwrap();
		store
			.add_webhook_event(id, "pull_request", Some("opened"), Some("octocat"), "{}")
			.await
			.unwrap();

		let events = store.get_webhook_events(id, 10).await.unwrap();
		assert_eq!(events.len(), 2);
		assert_eq!(events[0].event_type, "pull_request");
		assert_eq!(events[0].action.as_deref(), Some("opened"));
		assert_eq!(events[1].event_type, "push");
	}

	#[tokio::test]
	async fn test_list_repositories_for_user() {
		let (store, user_id) = make_stores().await;
		store.create_repository(&new_repo(user_id)).await.unwrap();

		let repos = store.list_repositories_for_user(user_id).await.unwrap();
		assert_eq!(repos.len(), 1);
		assert!(store.list_repositories_for_user(999).await.unwrap().is_empty());
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{
	SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;

use crate::error::DbError;

/// Pool tuning passed down from the server's database configuration.
///
/// The webhook path and the queue consumer share one pool, so the
/// connection count bounds both; the busy timeout covers writer
/// contention under WAL.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
	pub max_connections: u32,
	pub busy_timeout: Duration,
}

impl Default for PoolSettings {
	fn default() -> Self {
		Self {
			max_connections: 5,
			busy_timeout: Duration::from_secs(5),
		}
	}
}

/// Create a SqlitePool with WAL mode and the default [`PoolSettings`].
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid or connection fails.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	create_pool_with(database_url, PoolSettings::default()).await
}

/// Create a SqlitePool with WAL mode and explicit tuning.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./bobbin.db")
/// * `settings` - connection count and busy timeout
#[tracing::instrument(skip(database_url), fields(max_connections = settings.max_connections))]
pub async fn create_pool_with(
	database_url: &str,
	settings: PoolSettings,
) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.busy_timeout(settings.busy_timeout)
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(settings.max_connections)
		.connect_with(options)
		.await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

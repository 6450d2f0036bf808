// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database-backed repository lookup for the queue consumer.

use async_trait::async_trait;
use bobbin_notify::RepositorySummary;
use bobbin_queue::{QueueError, RepositoryDirectory};
use bobbin_server_db::RepoStore;

pub struct DbRepositoryDirectory {
	repos: RepoStore,
}

impl DbRepositoryDirectory {
	pub fn new(repos: RepoStore) -> Self {
		Self { repos }
	}
}

#[async_trait]
impl RepositoryDirectory for DbRepositoryDirectory {
	async fn get_summary(
		&self,
		repository_id: i64,
	) -> Result<Option<RepositorySummary>, QueueError> {
		let repository = self
			.repos
			.get_repository(repository_id)
			.await
			.map_err(|e| QueueError::Store(e.to_string()))?;
		Ok(repository.map(|r| r.summary()))
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database configuration.

use serde::Deserialize;

/// Database configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	pub url: String,
	/// Pool size shared by the HTTP handlers and the queue consumer.
	pub max_connections: u32,
	/// SQLite busy timeout in seconds (writer contention under WAL).
	pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: "sqlite:./bobbin.db".to_string(),
			max_connections: 5,
			busy_timeout_secs: 5,
		}
	}
}

/// Database configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub max_connections: Option<u32>,
	#[serde(default)]
	pub busy_timeout_secs: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.max_connections.is_some() {
			self.max_connections = other.max_connections;
		}
		if other.busy_timeout_secs.is_some() {
			self.busy_timeout_secs = other.busy_timeout_secs;
		}
	}

	pub fn finalize(self) -> DatabaseConfig {
		let defaults = DatabaseConfig::default();
		DatabaseConfig {
			url: self.url.unwrap_or(defaults.url),
			max_connections: self.max_connections.unwrap_or(defaults.max_connections),
			busy_timeout_secs: self.busy_timeout_secs.unwrap_or(defaults.busy_timeout_secs),
		}
	}
}

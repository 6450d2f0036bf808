// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Queue transport and consumer polling configuration.

use serde::Deserialize;

/// Queue configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct QueueConfig {
	/// Base URL of the HTTP queue gateway. `None` runs the in-process
	/// queue, which is fine for a single node.
	pub url: Option<String>,
	pub max_messages: usize,
	pub wait_secs: u64,
	pub error_backoff_secs: u64,
}

impl Default for QueueConfig {
	fn default() -> Self {
		Self {
			url: None,
			max_messages: 10,
			wait_secs: 20,
			error_backoff_secs: 5,
		}
	}
}

/// Queue configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub max_messages: Option<usize>,
	#[serde(default)]
	pub wait_secs: Option<u64>,
	#[serde(default)]
	pub error_backoff_secs: Option<u64>,
}

impl QueueConfigLayer {
	pub fn merge(&mut self, other: QueueConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.max_messages.is_some() {
			self.max_messages = other.max_messages;
		}
		if other.wait_secs.is_some() {
			self.wait_secs = other.wait_secs;
		}
		if other.error_backoff_secs.is_some() {
			self.error_backoff_secs = other.error_backoff_secs;
		}
	}

	pub fn finalize(self) -> QueueConfig {
		let defaults = QueueConfig::default();
		QueueConfig {
			url: self.url,
			max_messages: self.max_messages.unwrap_or(defaults.max_messages),
			wait_secs: self.wait_secs.unwrap_or(defaults.wait_secs),
			error_backoff_secs: self
				.error_backoff_secs
				.unwrap_or(defaults.error_backoff_secs),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_use_in_process_queue() {
		let config = QueueConfigLayer::default().finalize();
		assert!(config.url.is_none());
		assert_eq!(config.max_messages, 10);
		assert_eq!(config.wait_secs, 20);
		assert_eq!(config.error_backoff_secs, 5);
	}

	#[test]
	fn test_gateway_url() {
		let layer = QueueConfigLayer {
			url: Some("http://queue.internal:8080".to_string()),
			..Default::default()
		};
		let config = layer.finalize();
		assert_eq!(config.url.as_deref(), Some("http://queue.internal:8080"));
	}
}

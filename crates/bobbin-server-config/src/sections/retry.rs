// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry handler tuning.

use serde::Deserialize;

use crate::error::ConfigError;

/// Retry configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct RetryConfigSection {
	pub max_attempts: u32,
	pub base_delay_ms: u64,
	pub max_delay_ms: u64,
	pub jitter_ms: u64,
}

impl Default for RetryConfigSection {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay_ms: 1_000,
			max_delay_ms: 60_000,
			jitter_ms: 1_000,
		}
	}
}

/// Retry configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryConfigSectionLayer {
	#[serde(default)]
	pub max_attempts: Option<u32>,
	#[serde(default)]
	pub base_delay_ms: Option<u64>,
	#[serde(default)]
	pub max_delay_ms: Option<u64>,
	#[serde(default)]
	pub jitter_ms: Option<u64>,
}

impl RetryConfigSectionLayer {
	pub fn merge(&mut self, other: RetryConfigSectionLayer) {
		if other.max_attempts.is_some() {
			self.max_attempts = other.max_attempts;
		}
		if other.base_delay_ms.is_some() {
			self.base_delay_ms = other.base_delay_ms;
		}
		if other.max_delay_ms.is_some() {
			self.max_delay_ms = other.max_delay_ms;
		}
		if other.jitter_ms.is_some() {
			self.jitter_ms = other.jitter_ms;
		}
	}

	pub fn finalize(self) -> Result<RetryConfigSection, ConfigError> {
		let defaults = RetryConfigSection::default();
		let config = RetryConfigSection {
			max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
			base_delay_ms: self.base_delay_ms.unwrap_or(defaults.base_delay_ms),
			max_delay_ms: self.max_delay_ms.unwrap_or(defaults.max_delay_ms),
			jitter_ms: self.jitter_ms.unwrap_or(defaults.jitter_ms),
		};

		if config.max_attempts == 0 {
			return Err(ConfigError::Validation(
				"retry.max_attempts must be at least 1".to_string(),
			));
		}
		if config.base_delay_ms > config.max_delay_ms {
			return Err(ConfigError::Validation(format!(
				"retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
				config.base_delay_ms, config.max_delay_ms
			)));
		}

		Ok(config)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Bobbin server.
//!
//! Layered configuration: built-in defaults, then a TOML file, then
//! `BOBBIN_SERVER_*` environment variables, highest last.

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub queue: QueueConfig,
	pub retry: RetryConfigSection,
	pub smtp: Option<SmtpSection>,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`BOBBIN_SERVER_*`)
/// 2. Config file (`/etc/bobbin/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let queue = layer.queue.unwrap_or_default().finalize();
	let retry = layer.retry.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	let smtp = layer.smtp.and_then(|l| l.finalize());

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		queue_url_configured = queue.url.is_some(),
		smtp_configured = smtp.is_some(),
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		queue,
		retry,
		smtp,
		logging,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_socket_addr() {
		let config = ServerConfig {
			http: HttpConfig {
				host: "127.0.0.1".to_string(),
				port: 9000,
				base_url: "http://localhost:9000".to_string(),
			},
			..Default::default()
		};
		assert_eq!(config.socket_addr(), "127.0.0.1:9000");
	}

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.http.port, 3000);
		assert_eq!(config.database.url, "sqlite:./bobbin.db");
		assert!(config.queue.url.is_none());
		assert!(config.smtp.is_none());
		assert_eq!(config.retry.max_attempts, 3);
	}
}

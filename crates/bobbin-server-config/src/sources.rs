// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files, environment variables.

use std::path::PathBuf;

use bobbin_common_secret::SecretString;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, QueueConfigLayer,
	RetryConfigSectionLayer, SmtpSectionLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/bobbin/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: BOBBIN_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()?),
			queue: Some(load_queue_from_env()?),
			retry: Some(load_retry_from_env()?),
			smtp: Some(load_smtp_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u32(name: &str) -> Result<Option<u32>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u32 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("BOBBIN_SERVER_HOST"),
		port: env_u16("BOBBIN_SERVER_PORT")?,
		base_url: env_var("BOBBIN_SERVER_BASE_URL"),
	})
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("BOBBIN_SERVER_DATABASE_URL"),
		max_connections: env_u32("BOBBIN_SERVER_DATABASE_MAX_CONNECTIONS")?,
		busy_timeout_secs: env_u64("BOBBIN_SERVER_DATABASE_BUSY_TIMEOUT_SECS")?,
	})
}

fn load_queue_from_env() -> Result<QueueConfigLayer, ConfigError> {
	Ok(QueueConfigLayer {
		url: env_var("BOBBIN_SERVER_QUEUE_URL"),
		max_messages: env_usize("BOBBIN_SERVER_QUEUE_MAX_MESSAGES")?,
		wait_secs: env_u64("BOBBIN_SERVER_QUEUE_WAIT_SECS")?,
		error_backoff_secs: env_u64("BOBBIN_SERVER_QUEUE_ERROR_BACKOFF_SECS")?,
	})
}

fn load_retry_from_env() -> Result<RetryConfigSectionLayer, ConfigError> {
	Ok(RetryConfigSectionLayer {
		max_attempts: env_u32("BOBBIN_SERVER_RETRY_MAX_ATTEMPTS")?,
		base_delay_ms: env_u64("BOBBIN_SERVER_RETRY_BASE_DELAY_MS")?,
		max_delay_ms: env_u64("BOBBIN_SERVER_RETRY_MAX_DELAY_MS")?,
		jitter_ms: env_u64("BOBBIN_SERVER_RETRY_JITTER_MS")?,
	})
}

fn load_smtp_from_env() -> Result<SmtpSectionLayer, ConfigError> {
	Ok(SmtpSectionLayer {
		host: env_var("BOBBIN_SERVER_SMTP_HOST"),
		port: env_u16("BOBBIN_SERVER_SMTP_PORT")?,
		username: env_var("BOBBIN_SERVER_SMTP_USERNAME"),
		password: env_var("BOBBIN_SERVER_SMTP_PASSWORD").map(SecretString::new),
		from_address: env_var("BOBBIN_SERVER_SMTP_FROM_ADDRESS")
			.or_else(|| env_var("BOBBIN_SERVER_SMTP_FROM")),
		from_name: env_var("BOBBIN_SERVER_SMTP_FROM_NAME"),
		use_tls: env_bool("BOBBIN_SERVER_SMTP_USE_TLS"),
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("BOBBIN_SERVER_LOG_LEVEL"),
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP email client for Bobbin.
//!
//! Async sending via [`lettre`] with STARTTLS, optional authentication,
//! and multipart (HTML + plain text) bodies. Passwords come in as
//! [`SecretString`] so they never reach the logs.
//!
//! Two message kinds matter here: repository event notifications and
//! password reset links. Their builders live in [`emails`].

pub mod emails;

use bobbin_common_secret::SecretString;
use lettre::{
	message::{header::ContentType, Mailbox, MultiPart, SinglePart},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to connect to the SMTP server.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Failed to send an email message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid configuration (missing required fields, invalid values).
	#[error("invalid configuration: {0}")]
	Config(String),

	/// Invalid email address format.
	#[error("invalid email address: {0}")]
	Address(String),
}

/// Settings for the SMTP connection and sender identity.
///
/// The `password` field uses [`SecretString`]: Debug and Display are
/// redacted and the value is zeroized on drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
	/// SMTP server hostname (e.g., "smtp.gmail.com").
	pub host: String,

	/// SMTP server port. Common values: 25 (unencrypted), 465 (TLS), 587 (STARTTLS).
	pub port: u16,

	pub username: Option<String>,
	pub password: Option<SecretString>,

	/// Email address to send from (e.g., "noreply@example.com").
	pub from_address: String,

	/// Display name for the sender.
	pub from_name: String,

	/// Whether to use STARTTLS for the connection. Defaults to `true`.
	#[serde(default = "default_use_tls")]
	pub use_tls: bool,
}

fn default_use_tls() -> bool {
	true
}

impl SmtpConfig {
	/// Load SMTP configuration from environment variables.
	///
	/// # Environment Variables
	///
	/// - `BOBBIN_SERVER_SMTP_HOST` (required): SMTP server hostname
	/// - `BOBBIN_SERVER_SMTP_PORT` (optional, default: 587)
	/// - `BOBBIN_SERVER_SMTP_USERNAME` (optional)
	/// - `BOBBIN_SERVER_SMTP_PASSWORD` (optional)
	/// - `BOBBIN_SERVER_SMTP_FROM_ADDRESS` (required)
	/// - `BOBBIN_SERVER_SMTP_FROM_NAME` (optional, default: "Bobbin")
	/// - `BOBBIN_SERVER_SMTP_USE_TLS` (optional, default: true)
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Config`] if required variables are missing or invalid.
	pub fn from_env() -> Result<Self, SmtpError> {
		let host = env::var("BOBBIN_SERVER_SMTP_HOST")
			.map_err(|_| SmtpError::Config("BOBBIN_SERVER_SMTP_HOST is required".into()))?;

		let port = env::var("BOBBIN_SERVER_SMTP_PORT")
			.unwrap_or_else(|_| "587".into())
			.parse()
			.map_err(|_| {
				SmtpError::Config("BOBBIN_SERVER_SMTP_PORT must be a valid port number".into())
			})?;

		let username = env::var("BOBBIN_SERVER_SMTP_USERNAME").ok();
		let password = env::var("BOBBIN_SERVER_SMTP_PASSWORD")
			.ok()
			.map(SecretString::new);

		let from_address = env::var("BOBBIN_SERVER_SMTP_FROM_ADDRESS")
			.map_err(|_| SmtpError::Config("BOBBIN_SERVER_SMTP_FROM_ADDRESS is required".into()))?;

		let from_name = env::var("BOBBIN_SERVER_SMTP_FROM_NAME").unwrap_or_else(|_| "Bobbin".into());

		let use_tls = env::var("BOBBIN_SERVER_SMTP_USE_TLS")
			.map(|v| v.to_lowercase() != "false" && v != "0")
			.unwrap_or(true);

		Ok(Self {
			host,
			port,
			username,
			password,
			from_address,
			from_name,
			use_tls,
		})
	}
}

/// Async SMTP client. Built once at startup; the connection itself is
/// made lazily per send.
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from_mailbox: Mailbox,
}

impl SmtpClient {
	/// Validate the configuration and build the transport.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the from address is invalid,
	/// [`SmtpError::Connection`] if the transport cannot be built.
	#[tracing::instrument(
		name = "smtp_client_new",
		skip(config),
		fields(host = %config.host, port = %config.port, use_tls = %config.use_tls)
	)]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
			.parse()
			.map_err(|e| SmtpError::Address(format!("{e}")))?;

		let builder = if config.use_tls {
			AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?
		} else {
			AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
		};

		let mut builder = builder.port(config.port);

		if let (Some(username), Some(password)) = (config.username, config.password) {
			let credentials = Credentials::new(username, password.expose().to_string());
			builder = builder.credentials(credentials);
		}

		let transport = builder.build();

		tracing::debug!("SMTP client initialized");

		Ok(Self {
			transport,
			from_mailbox,
		})
	}

	/// Connection test against the configured server, for startup checks.
	#[tracing::instrument(name = "smtp_check_health", skip(self))]
	pub async fn check_health(&self) -> Result<(), SmtpError> {
		self
			.transport
			.test_connection()
			.await
			.map_err(|e| SmtpError::Connection(format!("{e}")))?;
		tracing::debug!("SMTP server is healthy");
		Ok(())
	}

	/// Send a multipart email with both HTML and plain text versions.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Address`] if the recipient address is invalid,
	/// [`SmtpError::Send`] if the email fails to send.
	#[tracing::instrument(
		name = "smtp_send_email",
		skip(self, body_html, body_text),
		fields(to = %to, subject = %subject)
	)]
	pub async fn send_email(
		&self,
		to: &str,
		subject: &str,
		body_html: &str,
		body_text: &str,
	) -> Result<(), SmtpError> {
		let to_mailbox: Mailbox = to.parse().map_err(|e| SmtpError::Address(format!("{e}")))?;

		let message = Message::builder()
			.from(self.from_mailbox.clone())
			.to(to_mailbox)
			.subject(subject)
			.multipart(
				MultiPart::alternative()
					.singlepart(
						SinglePart::builder()
							.header(ContentType::TEXT_PLAIN)
							.body(body_text.to_string()),
					)
					.singlepart(
						SinglePart::builder()
							.header(ContentType::TEXT_HTML)
							.body(body_html.to_string()),
					),
			)
			.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))?;

		self
			.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent");

		Ok(())
	}
}

/// Syntactic email address check via [`lettre`]'s [`Mailbox`] parser.
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Mailbox>().is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_valid_emails() {
		assert!(is_valid_email("user@example.com"));
		assert!(is_valid_email("User Name <user@example.com>"));
		assert!(is_valid_email("user+tag@mail.example.com"));
	}

	#[test]
	fn test_invalid_emails() {
		assert!(!is_valid_email(""));
		assert!(!is_valid_email("userexample.com"));
		assert!(!is_valid_email("user@"));
		assert!(!is_valid_email("@example.com"));
	}

	#[test]
	fn test_config_debug_does_not_leak_password() {
		let config = SmtpConfig {
			host: "smtp.example.com".to_string(),
			port: 587,
			username: Some("user".to_string()),
			password: Some(SecretString::new("super-secret-password".to_string())),
			from_address: "test@example.com".to_string(),
			from_name: "Test".to_string(),
			use_tls: true,
		};

		let debug = format!("{config:?}");
		assert!(!debug.contains("super-secret-password"));
		assert!(debug.contains("[REDACTED]"));
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn valid_emails_are_accepted(
				local in "[a-zA-Z][a-zA-Z0-9]{0,30}",
				domain in "[a-zA-Z][a-zA-Z0-9]{0,20}",
				tld in "(com|org|net|io|dev)"
			) {
				let email = format!("{local}@{domain}.{tld}");
				prop_assert!(is_valid_email(&email), "Expected valid: {}", email);
			}

			#[test]
			fn no_at_symbol_is_invalid(s in "[a-zA-Z0-9._%+-]{1,50}") {
				prop_assume!(!s.contains('@'));
				prop_assert!(!is_valid_email(&s));
			}

			#[test]
			fn password_never_in_config_debug(password in "[a-zA-Z0-9!#$%^&*]{8,32}") {
				prop_assume!(!password.contains("REDACTED"));
				prop_assume!(!password.contains("Secret"));

				let config = SmtpConfig {
					host: "smtp.example.com".to_string(),
					port: 587,
					username: Some("user".to_string()),
					password: Some(SecretString::new(password.clone())),
					from_address: "test@example.com".to_string(),
					from_name: "Test".to_string(),
					use_tls: true,
				};

				let debug = format!("{config:?}");
				prop_assert!(
					!debug.contains(&password),
					"Password leaked in debug output"
				);
			}
		}
	}
}

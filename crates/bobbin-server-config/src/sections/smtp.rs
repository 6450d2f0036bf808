// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP section. The whole section is optional; without a host the
//! server runs with email delivery disabled.

use bobbin_common_secret::SecretString;
use serde::Deserialize;

/// SMTP configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct SmtpSection {
	pub host: String,
	pub port: u16,
	pub username: Option<String>,
	pub password: Option<SecretString>,
	pub from_address: String,
	pub from_name: String,
	pub use_tls: bool,
}

/// SMTP configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpSectionLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<SecretString>,
	#[serde(default)]
	pub from_address: Option<String>,
	#[serde(default)]
	pub from_name: Option<String>,
	#[serde(default)]
	pub use_tls: Option<bool>,
}

impl SmtpSectionLayer {
	pub fn merge(&mut self, other: SmtpSectionLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.from_address.is_some() {
			self.from_address = other.from_address;
		}
		if other.from_name.is_some() {
			self.from_name = other.from_name;
		}
		if other.use_tls.is_some() {
			self.use_tls = other.use_tls;
		}
	}

	/// `None` unless both host and from address are set.
	pub fn finalize(self) -> Option<SmtpSection> {
		let host = self.host?;
		let from_address = self.from_address?;
		Some(SmtpSection {
			host,
			port: self.port.unwrap_or(587),
			username: self.username,
			password: self.password,
			from_address,
			from_name: self.from_name.unwrap_or_else(|| "Bobbin".to_string()),
			use_tls: self.use_tls.unwrap_or(true),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_incomplete_section_disables_smtp() {
		assert!(SmtpSectionLayer::default().finalize().is_none());

		let host_only = SmtpSectionLayer {
			host: Some("smtp.example.com".to_string()),
			..Default::default()
		};
		assert!(host_only.finalize().is_none());
	}

	#[test]
	fn test_complete_section() {
		let layer = SmtpSectionLayer {
			host: Some("smtp.example.com".to_string()),
			from_address: Some("noreply@example.com".to_string()),
			..Default::default()
		};
		let section = layer.finalize().unwrap();
		assert_eq!(section.port, 587);
		assert_eq!(section.from_name, "Bobbin");
		assert!(section.use_tls);
	}
}

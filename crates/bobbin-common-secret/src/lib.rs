// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret wrapper type that prevents accidental logging of sensitive values.
//!
//! [`SecretString`] wraps a `String` so that:
//! - `Debug` and `Display` print `[REDACTED]` instead of the value
//! - the backing memory is zeroized on drop
//! - serialization is opt-in via the `serde` feature (deserializes from a
//!   plain string, serializes the raw value; config files need both)
//!
//! Access to the inner value is explicit via [`SecretString::expose`], which
//! keeps every read of a secret greppable.

use zeroize::Zeroizing;

/// A string whose value must not leak into logs or debug output.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(value: String) -> Self {
		Self(Zeroizing::new(value))
	}

	/// Access the underlying secret value.
	pub fn expose(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl std::fmt::Debug for SecretString {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("SecretString([REDACTED])")
	}
}

impl std::fmt::Display for SecretString {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.expose() == other.expose()
	}
}

impl Eq for SecretString {}

#[cfg(feature = "serde")]
impl serde::Serialize for SecretString {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.expose())
	}
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SecretString {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(SecretString::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_debug_is_redacted() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(format!("{secret:?}"), "SecretString([REDACTED])");
	}

	#[test]
	fn test_display_is_redacted() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(format!("{secret}"), "[REDACTED]");
	}

	#[test]
	fn test_expose_returns_value() {
		let secret = SecretString::new("hunter2".to_string());
		assert_eq!(secret.expose(), "hunter2");
	}

	#[test]
	fn test_eq_compares_values() {
		let a = SecretString::from("same");
		let b = SecretString::from("same");
		let c = SecretString::from("different");
		assert_eq!(a, b);
		assert_ne!(a, c);
	}

	#[cfg(feature = "serde")]
	#[test]
	fn test_serde_roundtrip() {
		let secret = SecretString::from("token-value");
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, "\"token-value\"");
		let back: SecretString = serde_json::from_str(&json).unwrap();
		assert_eq!(back.expose(), "token-value");
	}
}

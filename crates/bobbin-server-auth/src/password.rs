// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use argon2::password_hash::{
	rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};

use crate::argon2_config::argon2_instance;
use crate::error::{AuthError, Result};

/// Hashes a password using Argon2 with a random salt.
pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);

	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|_| AuthError::Internal("Failed to hash password".to_string()))
}

/// Verifies a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
	let parsed_hash = PasswordHash::new(hash)
		.map_err(|_| AuthError::Internal("Invalid password hash format".to_string()))?;

	Ok(
		argon2_instance()
			.verify_password(password.as_bytes(), &parsed_hash)
			.is_ok(),
	)
}

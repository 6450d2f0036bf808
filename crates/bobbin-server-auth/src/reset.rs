// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password reset token lifecycle.
//!
//! Tokens are 32 random bytes, hex-encoded, valid for one hour and
//! single-use. Validation collapses every failure (unknown, expired,
//! already used) into the same `None` so callers cannot leak which
//! condition failed.

use chrono::{Duration, Utc};
use rand::RngCore;

use bobbin_server_db::{ResetTokenStore, User, UserStore};

use crate::error::Result;

const TOKEN_BYTES: usize = 32;
const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Clone)]
pub struct ResetTokenManager {
	tokens: ResetTokenStore,
	users: UserStore,
}

impl ResetTokenManager {
	pub fn new(tokens: ResetTokenStore, users: UserStore) -> Self {
		Self { tokens, users }
	}

	/// Issue a fresh reset token for a user. Older tokens for the same
	/// user stay valid until they expire or get consumed.
	#[tracing::instrument(skip(self), fields(user_id))]
	pub async fn create_token(&self, user_id: i64) -> Result<String> {
		let mut bytes = [0u8; TOKEN_BYTES];
		rand::rngs::OsRng.fill_bytes(&mut bytes);
		let token = hex::encode(bytes);

		let expires_at = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
		self.tokens.insert_token(user_id, &token, expires_at).await?;

		tracing::info!(user_id, "password reset token issued");
		Ok(token)
	}

	/// Resolve a token to its user if it is unused and unexpired.
	#[tracing::instrument(skip(self, token))]
	pub async fn validate_token(&self, token: &str) -> Result<Option<User>> {
		let Some(record) = self.tokens.find_valid_token(token, Utc::now()).await? else {
			return Ok(None);
		};
		Ok(self.users.get_user(record.user_id).await?)
	}

	/// Mark a token used. Returns `false` if it was not consumable, so a
	/// second concurrent reset with the same token fails.
	#[tracing::instrument(skip(self, token))]
	pub async fn consume_token(&self, token: &str) -> Result<bool> {
		let Some(record) = self.tokens.find_valid_token(token, Utc::now()).await? else {
			return Ok(false);
		};
		Ok(self.tokens.mark_used(record.id).await?)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the Bobbin server.
//!
//! SQLite via sqlx. Timestamps are stored as RFC 3339 TEXT columns and
//! parsed back to `DateTime<Utc>` at the store boundary.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repo;
pub mod reset_token;
pub mod testing;
pub mod types;
pub mod user;

pub use error::{DbError, Result};
pub use pool::{create_pool, create_pool_with, PoolSettings};
pub use repo::{NewRepository, RepoStore};
pub use reset_token::ResetTokenStore;
pub use types::{PasswordResetToken, Repository, User, WebhookEvent};
pub use user::UserStore;

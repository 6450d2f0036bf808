// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password hashing and reset token management for the Bobbin server.

mod argon2_config;
pub mod error;
pub mod password;
pub mod reset;

pub use error::{AuthError, Result};
pub use password::{hash_password, verify_password};
pub use reset::ResetTokenManager;

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bobbin webhook notification server.
//!
//! Receives signed GitHub webhooks, persists the events, formats
//! notification messages and pushes them through the queue pipeline.

pub mod api;
pub mod api_response;
pub mod directory;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use bobbin_server_config::ServerConfig;
pub use directory::DbRepositoryDirectory;

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

use bobbin_queue::{
	HttpQueue, MemoryQueue, MessageRetryHandler, QueueDispatcher, QueueError, QueueTransport,
	RetryConfig,
};
use bobbin_server_auth::ResetTokenManager;
use bobbin_server_config::ServerConfig;
use bobbin_server_db::{RepoStore, ResetTokenStore, UserStore};
use bobbin_server_smtp::{SmtpClient, SmtpConfig};

use crate::routes;

#[derive(Clone)]
pub struct AppState {
	pub repos: RepoStore,
	pub users: UserStore,
	pub dispatcher: QueueDispatcher,
	pub retry: MessageRetryHandler,
	pub reset: ResetTokenManager,
	pub smtp: Option<Arc<SmtpClient>>,
	/// Queue transport, shared with the consumer task.
	pub transport: Arc<dyn QueueTransport>,
	/// Public base URL for links in outbound emails.
	pub base_url: String,
}

/// Wire up stores, queue pipeline and SMTP from the resolved config.
pub async fn create_app_state(
	pool: SqlitePool,
	config: &ServerConfig,
) -> Result<AppState, QueueError> {
	let transport: Arc<dyn QueueTransport> = match &config.queue.url {
		Some(url) => Arc::new(HttpQueue::new(url)?),
		None => {
			tracing::info!("no queue URL configured, using in-process queue");
			Arc::new(MemoryQueue::new())
		}
	};

	let retry = MessageRetryHandler::new(
		transport.clone(),
		RetryConfig {
			max_attempts: config.retry.max_attempts,
			base_delay: Duration::from_millis(config.retry.base_delay_ms),
			max_delay: Duration::from_millis(config.retry.max_delay_ms),
			jitter: Duration::from_millis(config.retry.jitter_ms),
		},
	);
	let dispatcher = QueueDispatcher::new(transport.clone(), retry.clone());

	let repos = RepoStore::new(pool.clone());
	let users = UserStore::new(pool.clone());
	let reset = ResetTokenManager::new(ResetTokenStore::new(pool.clone()), users.clone());

	let smtp = match &config.smtp {
		Some(section) => {
			let client = SmtpClient::new(SmtpConfig {
				host: section.host.clone(),
				port: section.port,
				username: section.username.clone(),
				password: section.password.clone(),
				from_address: section.from_address.clone(),
				from_name: section.from_name.clone(),
				use_tls: section.use_tls,
			});
			match client {
				Ok(client) => Some(Arc::new(client)),
				Err(e) => {
					tracing::warn!(error = %e, "SMTP misconfigured, email delivery disabled");
					None
				}
			}
		}
		None => None,
	};

	Ok(AppState {
		repos,
		users,
		dispatcher,
		retry,
		reset,
		smtp,
		transport,
		base_url: config.http.base_url.clone(),
	})
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route(
			"/api/webhook/{repository_id}",
			post(routes::webhooks::receive_webhook),
		)
		.route(
			"/api/message-retry-status",
			get(routes::webhooks::retry_status),
		)
		.route(
			"/api/repositories/{repository_id}/webhook",
			post(routes::repositories::update_webhook_settings),
		)
		.route(
			"/api/repositories/{repository_id}/events",
			get(routes::repositories::list_webhook_events),
		)
		.route("/api/forgot-password", post(routes::auth::forgot_password))
		.route("/api/reset-password", post(routes::auth::reset_password))
		.with_state(state)
}

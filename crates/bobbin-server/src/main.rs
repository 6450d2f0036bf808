// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bobbin webhook notification server binary.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};

use bobbin_queue::{PollConfig, QueueConsumer};
use bobbin_server::{create_app_state, create_router, DbRepositoryDirectory};

/// Bobbin server - receives GitHub webhooks and dispatches notifications.
#[derive(Parser, Debug)]
#[command(
	name = "bobbin-server",
	about = "Bobbin webhook notification server",
	version
)]
struct Args {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("bobbin-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = bobbin_server_config::load_config()?;

	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting bobbin-server"
	);

	let pool = bobbin_server_db::create_pool_with(
		&config.database.url,
		bobbin_server_db::PoolSettings {
			max_connections: config.database.max_connections,
			busy_timeout: Duration::from_secs(config.database.busy_timeout_secs),
		},
	)
	.await?;
	bobbin_server_db::migrations::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config).await?;

	// Consumer polls the same transport the dispatcher sends to.
	let consumer = Arc::new(QueueConsumer::new(
		state.transport.clone(),
		Arc::new(DbRepositoryDirectory::new(state.repos.clone())),
		PollConfig {
			max_messages: config.queue.max_messages,
			wait: Duration::from_secs(config.queue.wait_secs),
			error_backoff: Duration::from_secs(config.queue.error_backoff_secs),
		},
	));
	let consumer_task = {
		let consumer = consumer.clone();
		tokio::spawn(async move { consumer.run().await })
	};

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Shutting down queue consumer...");
	consumer.shutdown();
	let _ = consumer_task.await;

	tracing::info!("Server shutdown complete");
	Ok(())
}

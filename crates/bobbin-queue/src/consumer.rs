// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Long-polling queue consumer.
//!
//! At-least-once delivery: a message is only deleted after it has been
//! processed, so a crash between receive and delete redelivers it once
//! the visibility timeout expires. Processing must tolerate replays.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bobbin_notify::{QueueEnvelope, RepositoryEvent, RepositorySummary};
use tokio::sync::broadcast;

use crate::error::Result;
use crate::transport::{QueueMessage, QueueTransport};

/// Lookup of repository metadata for incoming messages. Implemented over
/// the database in the server; tests use an in-memory map.
#[async_trait]
pub trait RepositoryDirectory: Send + Sync {
	async fn get_summary(&self, repository_id: i64) -> Result<Option<RepositorySummary>>;
}

/// Polling parameters. Defaults match the long-poll settings the pipeline
/// runs with in production.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
	pub max_messages: usize,
	pub wait: Duration,
	/// Pause after a failed receive before polling again.
	pub error_backoff: Duration,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			max_messages: 10,
			wait: Duration::from_secs(20),
			error_backoff: Duration::from_secs(5),
		}
	}
}

pub struct QueueConsumer<D: RepositoryDirectory> {
	transport: Arc<dyn QueueTransport>,
	directory: Arc<D>,
	config: PollConfig,
	shutdown_tx: broadcast::Sender<()>,
}

impl<D: RepositoryDirectory> QueueConsumer<D> {
	pub fn new(transport: Arc<dyn QueueTransport>, directory: Arc<D>, config: PollConfig) -> Self {
		let (shutdown_tx, _) = broadcast::channel(1);
		Self {
			transport,
			directory,
			config,
			shutdown_tx,
		}
	}

	/// Signal the run loop to stop after its current poll.
	pub fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());
	}

	/// Poll until shutdown. Receive errors are logged and followed by a
	/// backoff pause rather than terminating the loop.
	pub async fn run(&self) {
		let mut shutdown_rx = self.shutdown_tx.subscribe();
		tracing::info!(
			max_messages = self.config.max_messages,
			wait_secs = self.config.wait.as_secs(),
			"queue consumer started"
		);

		loop {
			tokio::select! {
				_ = shutdown_rx.recv() => {
					tracing::info!("queue consumer shutting down");
					return;
				}
				result = self.poll_once() => {
					if let Err(e) = result {
						tracing::error!(error = %e, "error polling queue");
						tokio::select! {
							_ = shutdown_rx.recv() => {
								tracing::info!("queue consumer shutting down");
								return;
							}
							_ = tokio::time::sleep(self.config.error_backoff) => {}
						}
					}
				}
			}
		}
	}

	/// One receive/process/delete cycle. Public so tests can drive the
	/// consumer without the run loop.
	pub async fn poll_once(&self) -> Result<()> {
		let messages = self
			.transport
			.receive(self.config.max_messages, self.config.wait)
			.await?;

		for message in messages {
			self.process_message(&message).await;
		}
		Ok(())
	}

	/// Handle a single message. Malformed bodies and unknown repositories
	/// are logged and left undeleted so they surface again after the
	/// visibility timeout instead of vanishing.
	async fn process_message(&self, message: &QueueMessage) {
		let envelope: QueueEnvelope = match serde_json::from_str(&message.body) {
			Ok(envelope) => envelope,
			Err(e) => {
				tracing::warn!(
					message_id = %message.message_id,
					error = %e,
					"skipping malformed queue message"
				);
				return;
			}
		};

		let repository = match self.directory.get_summary(envelope.repository.id).await {
			Ok(Some(repository)) => repository,
			Ok(None) => {
				tracing::warn!(
					message_id = %message.message_id,
					repository_id = envelope.repository.id,
					"repository not found, skipping message"
				);
				return;
			}
			Err(e) => {
				tracing::error!(
					message_id = %message.message_id,
					repository_id = envelope.repository.id,
					error = %e,
					"repository lookup failed, message will be redelivered"
				);
				return;
			}
		};

		self.handle_event(&envelope, &repository);

		if let Err(e) = self.transport.delete(&message.receipt_handle).await {
			tracing::error!(
				message_id = %message.message_id,
				error = %e,
				"failed to delete processed message, it may be redelivered"
			);
		}
	}

	fn handle_event(&self, envelope: &QueueEnvelope, repository: &RepositorySummary) {
		match envelope.event {
			RepositoryEvent::RepositoryAdded => {
				tracing::info!(
					repository = %repository.full_name,
					user = envelope.user.as_ref().map(|u| u.username.as_str()),
					message = %envelope.message,
					"repository added"
				);
			}
			RepositoryEvent::Push => {
				tracing::info!(
					repository = %repository.full_name,
					sender = envelope.sender.as_deref(),
					message = %envelope.message,
					"push received"
				);
			}
			RepositoryEvent::PullRequest => {
				tracing::info!(
					repository = %repository.full_name,
					sender = envelope.sender.as_deref(),
					action = envelope.action.as_deref(),
					message = %envelope.message,
					"pull request activity"
				);
			}
			RepositoryEvent::Issue | RepositoryEvent::Star | RepositoryEvent::Fork => {
				// Delivered but not yet acted on; acknowledged so it does
				// not redeliver forever.
				tracing::warn!(
					repository = %repository.full_name,
					event = %envelope.event,
					"unhandled event type"
				);
			}
		}
	}
}

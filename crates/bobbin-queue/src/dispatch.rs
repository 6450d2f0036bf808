// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outbound side of the pipeline: serialize an envelope, send it, hand it
//! to the retry handler if the send fails.

use std::sync::Arc;

use bobbin_notify::QueueEnvelope;
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::retry::MessageRetryHandler;
use crate::transport::QueueTransport;

/// Sends formatted notification envelopes to the queue. Failed sends are
/// registered with the retry handler under a fresh message id, so a queue
/// outage degrades to delayed delivery instead of silent loss.
#[derive(Clone)]
pub struct QueueDispatcher {
	transport: Arc<dyn QueueTransport>,
	retry: MessageRetryHandler,
}

impl QueueDispatcher {
	pub fn new(transport: Arc<dyn QueueTransport>, retry: MessageRetryHandler) -> Self {
		Self { transport, retry }
	}

	pub fn retry_handler(&self) -> &MessageRetryHandler {
		&self.retry
	}

	/// Serialize and send one envelope. Transport errors are returned to
	/// the caller after the message has been queued for retry; config
	/// errors are fatal and skip the retry handoff.
	#[tracing::instrument(skip(self, envelope), fields(event = %envelope.event, repository = %envelope.repository.full_name))]
	pub async fn dispatch(&self, envelope: &QueueEnvelope) -> Result<()> {
		let body = serde_json::to_string(envelope)?;

		match self.transport.send(&body).await {
			Ok(()) => {
				tracing::info!("message sent to queue");
				Ok(())
			}
			Err(e @ QueueError::Config(_)) => {
				tracing::error!(error = %e, "queue misconfigured, message not sent");
				Err(e)
			}
			Err(e) => {
				let message_id = Uuid::new_v4().to_string();
				tracing::error!(
					error = %e,
					message_id = %message_id,
					"failed to send message, handing off to retry queue"
				);
				self
					.retry
					.add_to_retry_queue(message_id, envelope.clone())
					.await;
				Err(e)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryQueue;
	use crate::retry::RetryConfig;
	use crate::transport::QueueMessage;
	use async_trait::async_trait;
	use bobbin_notify::{RepositoryEvent, RepositorySummary};
	use chrono::Utc;
	use std::time::Duration;

	fn test_envelope() -> QueueEnvelope {
		QueueEnvelope {
			event: RepositoryEvent::RepositoryAdded,
			message: "Repository octocat/hello was added by octocat".to_string(),
			timestamp: Utc::now(),
			repository: RepositorySummary {
				id: 7,
				name: "hello".to_string(),
				full_name: "octocat/hello".to_string(),
				url: "https://github.com/octocat/hello".to_string(),
			},
			sender: None,
			action: None,
			user: Some(bobbin_notify::EnvelopeUser {
				id: 1,
				username: "octocat".to_string(),
			}),
		}
	}

	struct FailingTransport;

	#[async_trait]
	impl QueueTransport for FailingTransport {
		async fn send(&self, _body: &str) -> Result<()> {
			Err(QueueError::Transport("connection refused".into()))
		}

		async fn receive(&self, _max: usize, _wait: Duration) -> Result<Vec<QueueMessage>> {
			Ok(Vec::new())
		}

		async fn delete(&self, _receipt_handle: &str) -> Result<()> {
			Ok(())
		}
	}

	fn slow_retry(transport: Arc<dyn QueueTransport>) -> MessageRetryHandler {
		// Long delays so registered messages stay visible in status().
		MessageRetryHandler::new(
			transport,
			RetryConfig {
				max_attempts: 3,
				base_delay: Duration::from_secs(30),
				max_delay: Duration::from_secs(60),
				jitter: Duration::from_millis(1),
			},
		)
	}

	#[tokio::test]
	async fn test_dispatch_sends_envelope() {
		let queue = Arc::new(MemoryQueue::new());
		let retry = slow_retry(queue.clone());
		let dispatcher = QueueDispatcher::new(queue.clone(), retry);

		dispatcher.dispatch(&test_envelope()).await.unwrap();

		let messages = queue.receive(10, Duration::from_millis(50)).await.unwrap();
		assert_eq!(messages.len(), 1);
		let parsed: QueueEnvelope = serde_json::from_str(&messages[0].body).unwrap();
		assert_eq!(parsed.repository.full_name, "octocat/hello");
	}

	#[tokio::test]
	async fn test_failed_dispatch_lands_in_retry_queue() {
		let transport = Arc::new(FailingTransport);
		let retry = slow_retry(transport.clone());
		let dispatcher = QueueDispatcher::new(transport, retry);

		let result = dispatcher.dispatch(&test_envelope()).await;
		assert!(result.is_err());

		let status = dispatcher.retry_handler().status().await;
		assert_eq!(status.queue_size, 1);
		assert_eq!(status.messages[0].attempts, 1);
	}
}

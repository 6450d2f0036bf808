// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded exponential-backoff retries for failed queue sends.
//!
//! The handler keeps an in-memory table of messages awaiting re-delivery.
//! Messages that exhaust their attempts are dropped with a terminal error
//! log; there is no dead-letter store, and notification loss is an accepted
//! failure mode of this pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bobbin_notify::QueueEnvelope;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::transport::QueueTransport;

/// Retry tuning. All fields have the defaults the pipeline shipped with;
/// tests shrink the delays instead of faking a clock.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	/// Upper bound of the random jitter added to every delay, to spread
	/// out retries after a queue outage.
	pub jitter: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(60),
			jitter: Duration::from_millis(1000),
		}
	}
}

struct RetryEntry {
	envelope: QueueEnvelope,
	attempt: u32,
	last_attempt: DateTime<Utc>,
}

/// Snapshot of the retry table, served on the diagnostics endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryQueueStatus {
	pub queue_size: usize,
	pub messages: Vec<RetryMessageStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetryMessageStatus {
	pub id: String,
	pub attempts: u32,
}

/// Retry engine for failed outbound sends.
///
/// Explicitly constructed and injected, with no ambient singletons, so tests
/// can substitute a fake transport and millisecond delays. The table is
/// mutex-guarded: retry timers fire on the runtime's worker threads
/// concurrently with new `add_to_retry_queue` calls.
#[derive(Clone)]
pub struct MessageRetryHandler {
	transport: Arc<dyn QueueTransport>,
	config: RetryConfig,
	table: Arc<Mutex<HashMap<String, RetryEntry>>>,
}

impl MessageRetryHandler {
	pub fn new(transport: Arc<dyn QueueTransport>, config: RetryConfig) -> Self {
		Self {
			transport,
			config,
			table: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	/// Backoff before retry `attempt` (1-based):
	/// `min(base * 2^(attempt-1), max_delay)` plus random jitter.
	fn backoff_delay(&self, attempt: u32) -> Duration {
		let exponential = self
			.config
			.base_delay
			.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
		let capped = exponential.min(self.config.max_delay);
		capped + self.config.jitter.mul_f64(fastrand::f64())
	}

	/// Register a message whose direct send failed and schedule its first
	/// retry immediately.
	#[tracing::instrument(skip(self, envelope), fields(event = %envelope.event))]
	pub async fn add_to_retry_queue(&self, message_id: String, envelope: QueueEnvelope) {
		let delay = self.backoff_delay(1);
		{
			let mut table = self.table.lock().await;
			table.insert(
				message_id.clone(),
				RetryEntry {
					envelope,
					attempt: 1,
					last_attempt: Utc::now(),
				},
			);
		}

		tracing::info!(
			message_id = %message_id,
			delay_ms = delay.as_millis() as u64,
			"message added to retry queue"
		);
		self.spawn_retry_task(message_id);
	}

	/// Snapshot of pending retries: total size plus id/attempt pairs.
	pub async fn status(&self) -> RetryQueueStatus {
		let table = self.table.lock().await;
		RetryQueueStatus {
			queue_size: table.len(),
			messages: table
				.iter()
				.map(|(id, entry)| RetryMessageStatus {
					id: id.clone(),
					attempts: entry.attempt,
				})
				.collect(),
		}
	}

	fn spawn_retry_task(&self, message_id: String) {
		let handler = self.clone();

		tokio::spawn(async move {
			loop {
				let (attempt, body) = {
					let table = handler.table.lock().await;
					let Some(entry) = table.get(&message_id) else {
						return;
					};
					match serde_json::to_string(&entry.envelope) {
						Ok(body) => (entry.attempt, body),
						Err(e) => {
							tracing::error!(
								message_id = %message_id,
								error = %e,
								"failed to serialize envelope, dropping message"
							);
							drop(table);
							handler.table.lock().await.remove(&message_id);
							return;
						}
					}
				};

				tokio::time::sleep(handler.backoff_delay(attempt)).await;

				match handler.transport.send(&body).await {
					Ok(()) => {
						handler.table.lock().await.remove(&message_id);
						tracing::info!(
							message_id = %message_id,
							attempt,
							"retry succeeded, message removed from retry queue"
						);
						return;
					}
					Err(e) => {
						let mut table = handler.table.lock().await;
						let Some(entry) = table.get_mut(&message_id) else {
							return;
						};

						if entry.attempt < handler.config.max_attempts {
							entry.attempt += 1;
							entry.last_attempt = Utc::now();
							tracing::warn!(
								message_id = %message_id,
								attempt,
								error = %e,
								"retry failed, rescheduling"
							);
							// Loop continues with the incremented attempt.
						} else {
							tracing::error!(
								message_id = %message_id,
								attempts = entry.attempt,
								event = %entry.envelope.event,
								error = %e,
								"max retry attempts reached, dropping message"
							);
							table.remove(&message_id);
							return;
						}
					}
				}
			}
		});
	}
}

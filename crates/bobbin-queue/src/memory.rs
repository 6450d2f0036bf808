// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process queue transport with visibility-timeout redelivery.
//!
//! Used by tests and single-node deployments. Messages received but not
//! deleted become visible again once the visibility timeout elapses, which
//! is exactly the redelivery behaviour the consumer's error handling relies
//! on.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::transport::{QueueMessage, QueueTransport};

const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct StoredMessage {
	message_id: String,
	body: String,
}

#[derive(Default)]
struct Inner {
	ready: VecDeque<StoredMessage>,
	/// Receipt handle -> (message, instant at which it becomes ready again).
	in_flight: HashMap<String, (StoredMessage, Instant)>,
}

pub struct MemoryQueue {
	inner: Mutex<Inner>,
	notify: Notify,
	visibility_timeout: Duration,
}

impl MemoryQueue {
	pub fn new() -> Self {
		Self::with_visibility_timeout(DEFAULT_VISIBILITY_TIMEOUT)
	}

	pub fn with_visibility_timeout(visibility_timeout: Duration) -> Self {
		Self {
			inner: Mutex::new(Inner::default()),
			notify: Notify::new(),
			visibility_timeout,
		}
	}

	/// Total messages held (ready + in flight). Diagnostic only.
	pub async fn depth(&self) -> usize {
		let inner = self.inner.lock().await;
		inner.ready.len() + inner.in_flight.len()
	}

	fn reclaim_expired(inner: &mut Inner, now: Instant) {
		let expired: Vec<String> = inner
			.in_flight
			.iter()
			.filter(|(_, (_, deadline))| *deadline <= now)
			.map(|(receipt, _)| receipt.clone())
			.collect();
		for receipt in expired {
			if let Some((message, _)) = inner.in_flight.remove(&receipt) {
				tracing::debug!(message_id = %message.message_id, "visibility timeout expired, message requeued");
				inner.ready.push_back(message);
			}
		}
	}
}

impl Default for MemoryQueue {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl QueueTransport for MemoryQueue {
	async fn send(&self, body: &str) -> Result<()> {
		let mut inner = self.inner.lock().await;
		inner.ready.push_back(StoredMessage {
			message_id: Uuid::new_v4().to_string(),
			body: body.to_string(),
		});
		drop(inner);
		self.notify.notify_waiters();
		Ok(())
	}

	async fn receive(&self, max_messages: usize, wait: Duration) -> Result<Vec<QueueMessage>> {
		let deadline = Instant::now() + wait;

		loop {
			{
				let mut inner = self.inner.lock().await;
				let now = Instant::now();
				Self::reclaim_expired(&mut inner, now);

				if !inner.ready.is_empty() {
					let mut batch = Vec::with_capacity(max_messages.min(inner.ready.len()));
					while batch.len() < max_messages {
						let Some(message) = inner.ready.pop_front() else {
							break;
						};
						let receipt_handle = Uuid::new_v4().to_string();
						inner.in_flight.insert(
							receipt_handle.clone(),
							(message.clone(), now + self.visibility_timeout),
						);
						batch.push(QueueMessage {
							message_id: message.message_id,
							receipt_handle,
							body: message.body,
						});
					}
					return Ok(batch);
				}
			}

			let now = Instant::now();
			if now >= deadline {
				return Ok(Vec::new());
			}

			// Wake on a new send, or re-check periodically so messages whose
			// visibility timeout lapses mid-poll are picked up.
			let recheck = deadline.min(now + Duration::from_millis(50));
			tokio::select! {
				_ = self.notify.notified() => {}
				_ = tokio::time::sleep_until(recheck) => {}
			}
		}
	}

	async fn delete(&self, receipt_handle: &str) -> Result<()> {
		let mut inner = self.inner.lock().await;
		match inner.in_flight.remove(receipt_handle) {
			Some(_) => Ok(()),
			None => Err(QueueError::Transport(format!(
				"unknown or expired receipt handle: {receipt_handle}"
			))),
		}
	}
}

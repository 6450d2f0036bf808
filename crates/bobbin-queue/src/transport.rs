// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// A message as handed to a consumer by the transport.
#[derive(Debug, Clone)]
pub struct QueueMessage {
	/// Stable id assigned by the queue when the message was sent.
	pub message_id: String,
	/// Per-delivery handle used to acknowledge (delete) this delivery.
	/// Invalidated when the visibility timeout expires.
	pub receipt_handle: String,
	pub body: String,
}

/// The primitive operations of a durable queue.
///
/// Semantics expected of implementations:
/// - `receive` long-polls up to `wait` and returns at most `max_messages`;
///   received messages become invisible to other receives until deleted or
///   until the transport's visibility timeout expires, after which they are
///   redelivered (at-least-once delivery).
/// - `delete` acknowledges a specific delivery by receipt handle.
#[async_trait]
pub trait QueueTransport: Send + Sync {
	async fn send(&self, body: &str) -> Result<()>;

	async fn receive(&self, max_messages: usize, wait: Duration) -> Result<Vec<QueueMessage>>;

	async fn delete(&self, receipt_handle: &str) -> Result<()>;
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP queue-gateway transport.
//!
//! Speaks a small JSON protocol against a durable queue gateway:
//! - `POST   {base}/messages` enqueues `{"body": "..."}`
//! - `GET    {base}/messages?max=N&wait=S` long-polls for messages
//! - `DELETE {base}/messages/{receiptHandle}` acknowledges a delivery
//!
//! The gateway owns durability and the visibility timeout; this client only
//! maps transport failures into [`QueueError::Transport`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{QueueError, Result};
use crate::transport::{QueueMessage, QueueTransport};

/// Extra headroom on top of the long-poll wait before the HTTP call itself
/// is abandoned.
const RECEIVE_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
	message_id: String,
	receipt_handle: String,
	body: String,
}

pub struct HttpQueue {
	client: reqwest::Client,
	base_url: String,
}

impl HttpQueue {
	/// Create a transport for the gateway at `base_url`.
	///
	/// An empty URL is a configuration error, surfaced immediately rather
	/// than on first send.
	pub fn new(base_url: impl Into<String>) -> Result<Self> {
		let base_url = base_url.into();
		if base_url.is_empty() {
			return Err(QueueError::Config("queue URL is not configured".into()));
		}
		let base_url = base_url.trim_end_matches('/').to_string();

		let client = reqwest::Client::builder()
			.build()
			.map_err(|e| QueueError::Config(format!("failed to build HTTP client: {e}")))?;

		Ok(Self { client, base_url })
	}
}

#[async_trait]
impl QueueTransport for HttpQueue {
	#[tracing::instrument(skip(self, body))]
	async fn send(&self, body: &str) -> Result<()> {
		let response = self
			.client
			.post(format!("{}/messages", self.base_url))
			.timeout(REQUEST_TIMEOUT)
			.json(&serde_json::json!({ "body": body }))
			.send()
			.await
			.map_err(|e| QueueError::Transport(format!("send failed: {e}")))?;

		if !response.status().is_success() {
			return Err(QueueError::Transport(format!(
				"send rejected with status {}",
				response.status()
			)));
		}

		Ok(())
	}

	#[tracing::instrument(skip(self))]
	async fn receive(&self, max_messages: usize, wait: Duration) -> Result<Vec<QueueMessage>> {
		let response = self
			.client
			.get(format!("{}/messages", self.base_url))
			.query(&[
				("max", max_messages.to_string()),
				("wait", wait.as_secs().to_string()),
			])
			.timeout(wait + RECEIVE_TIMEOUT_MARGIN)
			.send()
			.await
			.map_err(|e| QueueError::Transport(format!("receive failed: {e}")))?;

		if !response.status().is_success() {
			return Err(QueueError::Transport(format!(
				"receive rejected with status {}",
				response.status()
			)));
		}

		let messages: Vec<WireMessage> = response
			.json()
			.await
			.map_err(|e| QueueError::Transport(format!("malformed receive response: {e}")))?;

		Ok(messages
			.into_iter()
			.map(|m| QueueMessage {
				message_id: m.message_id,
				receipt_handle: m.receipt_handle,
				body: m.body,
			})
			.collect())
	}

	#[tracing::instrument(skip(self))]
	async fn delete(&self, receipt_handle: &str) -> Result<()> {
		let response = self
			.client
			.delete(format!("{}/messages/{receipt_handle}", self.base_url))
			.timeout(REQUEST_TIMEOUT)
			.send()
			.await
			.map_err(|e| QueueError::Transport(format!("delete failed: {e}")))?;

		if !response.status().is_success() {
			return Err(QueueError::Transport(format!(
				"delete rejected with status {}",
				response.status()
			)));
		}

		Ok(())
	}
}

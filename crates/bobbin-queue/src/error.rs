// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
	/// The queue endpoint is missing or misconfigured. Fatal at the call
	/// site; never retried, since retrying a misconfiguration wastes attempts.
	#[error("Queue configuration error: {0}")]
	Config(String),

	/// The transport call failed (endpoint unreachable, rejected, timed
	/// out). Recoverable via the retry handler.
	#[error("Queue transport error: {0}")]
	Transport(String),

	/// The backing store failed while resolving a message's repository.
	#[error("Store error: {0}")]
	Store(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QueueError>;

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::RepositoryEvent;

/// The subset of a repository carried on the queue.
///
/// Field names match the wire schema consumers already speak (`fullName`,
/// not `full_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
	pub id: i64,
	pub name: String,
	#[serde(rename = "fullName")]
	pub full_name: String,
	pub url: String,
}

/// The user that triggered the event, when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeUser {
	pub id: i64,
	pub username: String,
}

/// The message placed on the durable queue for each accepted event.
///
/// Ephemeral: it lives only on the queue and is consumed at-least-once, so
/// everything a consumer needs must be carried here; consumers only go back
/// to the database to confirm the repository still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEnvelope {
	pub event: RepositoryEvent,
	pub message: String,
	pub timestamp: DateTime<Utc>,
	pub repository: RepositorySummary,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sender: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub action: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<EnvelopeUser>,
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// The closed set of repository events the pipeline knows about.
///
/// Adding a new event type is a compile-time-checked change: the consumer
/// dispatches with an exhaustive `match`, so a new variant will not compile
/// until every handler site decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryEvent {
	RepositoryAdded,
	Push,
	PullRequest,
	Issue,
	Star,
	Fork,
}

impl RepositoryEvent {
	/// The wire name, as used in the queue envelope and the
	/// `x-github-event` header.
	pub fn as_str(&self) -> &'static str {
		match self {
			RepositoryEvent::RepositoryAdded => "repository_added",
			RepositoryEvent::Push => "push",
			RepositoryEvent::PullRequest => "pull_request",
			RepositoryEvent::Issue => "issue",
			RepositoryEvent::Star => "star",
			RepositoryEvent::Fork => "fork",
		}
	}

	/// Parse a wire name. Returns `None` for unknown event strings so the
	/// caller decides whether that is a 400 or a warn-and-skip.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"repository_added" => Some(RepositoryEvent::RepositoryAdded),
			"push" => Some(RepositoryEvent::Push),
			"pull_request" => Some(RepositoryEvent::PullRequest),
			"issue" | "issues" => Some(RepositoryEvent::Issue),
			"star" => Some(RepositoryEvent::Star),
			"fork" => Some(RepositoryEvent::Fork),
			_ => None,
		}
	}
}

impl std::fmt::Display for RepositoryEvent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging sources.

use serde::Deserialize;

use crate::sections::{
	DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, QueueConfigLayer,
	RetryConfigSectionLayer, SmtpSectionLayer,
};

/// One source's worth of configuration. Every section is optional so a
/// TOML file or the environment can set only what it cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub queue: Option<QueueConfigLayer>,
	#[serde(default)]
	pub retry: Option<RetryConfigSectionLayer>,
	#[serde(default)]
	pub smtp: Option<SmtpSectionLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge `other` on top of this layer. Set fields in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.queue, other.queue, QueueConfigLayer::merge);
		merge_section(&mut self.retry, other.retry, RetryConfigSectionLayer::merge);
		merge_section(&mut self.smtp, other.smtp, SmtpSectionLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: impl Fn(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(base), Some(other)) => merge(base, other),
		(None, Some(other)) => *base = Some(other),
		_ => {}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository event model, notification message templates and the queue
//! envelope wire type.
//!
//! This crate is pure data and pure functions: no I/O, no clocks. The
//! formatter is deliberately not a general templating engine: it resolves
//! `{{dot.path}}` placeholders against a JSON view of the variables and
//! leaves anything it cannot resolve verbatim, so formatting can never block
//! a delivery.

pub mod envelope;
pub mod event;
pub mod templates;

pub use envelope::{EnvelopeUser, QueueEnvelope, RepositorySummary};
pub use event::RepositoryEvent;
pub use templates::{format_message, format_template, template_for_event, MessageTemplate};

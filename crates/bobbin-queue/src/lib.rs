// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Durable queue plumbing for the Bobbin notification pipeline.
//!
//! This crate provides:
//! - [`QueueTransport`] - the send/receive/delete primitives of a durable
//!   queue with visibility-timeout redelivery
//! - [`MemoryQueue`] and [`HttpQueue`] - in-process and HTTP gateway
//!   transports
//! - [`QueueDispatcher`] - producer side: serialize an envelope, send it,
//!   and hand failures to the retry handler
//! - [`MessageRetryHandler`] - bounded exponential-backoff retries for
//!   failed sends
//! - [`QueueConsumer`] - the cancellable long-poll worker that drains the
//!   queue and acknowledges messages only after successful handling
//!
//! Delivery is at-least-once end to end: the dispatcher may retry a send
//! that actually reached the queue, and the consumer only deletes after
//! handling. Every handler must therefore tolerate replays.

pub mod consumer;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod memory;
pub mod retry;
pub mod transport;

pub use consumer::{PollConfig, QueueConsumer, RepositoryDirectory};
pub use dispatch::QueueDispatcher;
pub use error::{QueueError, Result};
pub use http::HttpQueue;
pub use memory::MemoryQueue;
pub use retry::{MessageRetryHandler, RetryConfig, RetryMessageStatus, RetryQueueStatus};
pub use transport::{QueueMessage, QueueTransport};

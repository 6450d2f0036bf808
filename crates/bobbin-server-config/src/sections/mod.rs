// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod database;
mod http;
mod logging;
mod queue;
mod retry;
mod smtp;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use queue::{QueueConfig, QueueConfigLayer};
pub use retry::{RetryConfigSection, RetryConfigSectionLayer};
pub use smtp::{SmtpSection, SmtpSectionLayer};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builders for the two email kinds Bobbin sends.

use bobbin_notify::QueueEnvelope;

/// Subject and bodies for a repository event notification.
pub struct EmailContent {
	pub subject: String,
	pub html: String,
	pub text: String,
}

/// Render a notification email from a formatted queue envelope.
pub fn notification_email(envelope: &QueueEnvelope) -> EmailContent {
	let subject = format!("Repository Event: {}", envelope.event);
	let html = format!(
		"<h2>{}</h2>\
		 <p>{}</p>\
		 <p><a href=\"{}\">{}</a></p>\
		 <p style=\"color:#666;font-size:12px\">{}</p>",
		html_escape(&envelope.repository.full_name),
		html_escape(&envelope.message),
		html_escape(&envelope.repository.url),
		html_escape(&envelope.repository.url),
		envelope.timestamp.to_rfc3339(),
	);
	let text = format!(
		"{}\n\n{}\n{}\n",
		envelope.message, envelope.repository.url, envelope.timestamp
	);
	EmailContent {
		subject,
		html,
		text,
	}
}

/// Render a password reset email. `reset_url` is the full link including
/// the token; the link expires one hour after issue.
pub fn password_reset_email(username: &str, reset_url: &str) -> EmailContent {
	let subject = "Reset your Bobbin password".to_string();
	let html = format!(
		"<p>Hi {},</p>\
		 <p>A password reset was requested for your account. \
		 <a href=\"{}\">Reset your password</a>.</p>\
		 <p>This link expires in one hour. If you did not request a reset, \
		 you can ignore this email.</p>",
		html_escape(username),
		html_escape(reset_url),
	);
	let text = format!(
		"Hi {username},\n\n\
		 A password reset was requested for your account. Visit this link to \
		 reset your password:\n\n{reset_url}\n\n\
		 This link expires in one hour. If you did not request a reset, you \
		 can ignore this email.\n"
	);
	EmailContent {
		subject,
		html,
		text,
	}
}

fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use bobbin_notify::{RepositoryEvent, RepositorySummary};
	use chrono::Utc;

	#[test]
	fn test_notification_email_subject_names_event() {
		let envelope = QueueEnvelope {
			event: RepositoryEvent::Push,
			message: "New push to octocat/hello by octocat".to_string(),
			timestamp: Utc::now(),
			repository: RepositorySummary {
				id: 1,
				name: "hello".to_string(),
				full_name: "octocat/hello".to_string(),
				url: "https://github.com/octocat/hello".to_string(),
			},
			sender: Some("octocat".to_string()),
			action: None,
			user: None,
		};

		let email = notification_email(&envelope);
		assert_eq!(email.subject, "Repository Event: push");
		assert!(email.text.contains("New push to octocat/hello"));
		assert!(email.html.contains("octocat/hello"));
	}

	#[test]
	fn test_reset_email_contains_link() {
		let email = password_reset_email("octocat", "https://bobbin.dev/reset?token=abc123");
		assert!(email.html.contains("https://bobbin.dev/reset?token=abc123"));
		assert!(email.text.contains("https://bobbin.dev/reset?token=abc123"));
		assert!(email.text.contains("expires in one hour"));
	}

	#[test]
	fn test_html_is_escaped() {
		let email = password_reset_email("<script>", "https://example.com/?a=1&b=2");
		assert!(!email.html.contains("<script>"));
		assert!(email.html.contains("&lt;script&gt;"));
		assert!(email.html.contains("a=1&amp;b=2"));
	}
}

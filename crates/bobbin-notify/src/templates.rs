// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Notification message templates and the placeholder formatter.

use serde_json::Value;

use crate::event::RepositoryEvent;

/// A human-readable notification template for one event type.
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplate {
	pub id: &'static str,
	pub name: &'static str,
	pub template: &'static str,
	pub description: &'static str,
	pub event: RepositoryEvent,
}

/// Default templates. The first entry doubles as the fallback for event
/// types without a template of their own.
pub const DEFAULT_TEMPLATES: &[MessageTemplate] = &[
	MessageTemplate {
		id: "repo-added",
		name: "Repository Added",
		template: "{{user.username}} added a new repository: {{repository.name}}. Access it at {{repository.url}}",
		description: "Sent when a new repository is added to tracking",
		event: RepositoryEvent::RepositoryAdded,
	},
	MessageTemplate {
		id: "repo-push",
		name: "Repository Push",
		template: "New push to {{repository.fullName}} by {{sender}}",
		description: "Sent when code is pushed to the repository",
		event: RepositoryEvent::Push,
	},
	MessageTemplate {
		id: "pull-request",
		name: "Pull Request",
		template: "New pull request in {{repository.fullName}}: {{action}} by {{sender}}",
		description: "Sent when a pull request is created or updated",
		event: RepositoryEvent::PullRequest,
	},
];

/// Look up the template for an event type.
///
/// Event types without a dedicated template (issue, star, fork) fall back
/// to the first template rather than failing; formatting never blocks a
/// delivery.
pub fn template_for_event(event: RepositoryEvent) -> &'static MessageTemplate {
	DEFAULT_TEMPLATES
		.iter()
		.find(|t| t.event == event)
		.unwrap_or(&DEFAULT_TEMPLATES[0])
}

/// Render a template against a JSON view of the variables.
///
/// `{{path.to.value}}` placeholders are resolved by walking object keys.
/// A placeholder whose path hits a missing key or a null is left in the
/// output verbatim.
pub fn format_template(template: &str, variables: &Value) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(start) = rest.find("{{") {
		out.push_str(&rest[..start]);
		let after = &rest[start + 2..];
		match after.find("}}") {
			Some(end) => {
				let path = &after[..end];
				match resolve_path(variables, path.trim()) {
					Some(value) => out.push_str(&value),
					None => {
						// Unresolved placeholders stay verbatim.
						out.push_str("{{");
						out.push_str(path);
						out.push_str("}}");
					}
				}
				rest = &after[end + 2..];
			}
			None => {
				// Unterminated opener, emit the remainder as-is.
				out.push_str(&rest[start..]);
				return out;
			}
		}
	}

	out.push_str(rest);
	out
}

/// Format the notification message for an event.
pub fn format_message(event: RepositoryEvent, variables: &Value) -> String {
	format_template(template_for_event(event).template, variables)
}

fn resolve_path(root: &Value, path: &str) -> Option<String> {
	let mut current = root;
	for key in path.split('.') {
		current = current.get(key)?;
	}
	match current {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn push_vars() -> Value {
		json!({
			"repository": {
				"id": 7,
				"name": "hello",
				"fullName": "octocat/hello",
				"url": "https://github.com/octocat/hello"
			},
			"sender": "octocat"
		})
	}

	#[test]
	fn test_format_push_message() {
		let message = format_message(RepositoryEvent::Push, &push_vars());
		assert_eq!(message, "New push to octocat/hello by octocat");
	}

	#[test]
	fn test_format_pull_request_message() {
		let vars = json!({
			"repository": { "fullName": "octocat/hello" },
			"sender": "octocat",
			"action": "opened"
		});
		let message = format_message(RepositoryEvent::PullRequest, &vars);
		assert_eq!(message, "New pull request in octocat/hello: opened by octocat");
	}

	#[test]
	fn test_missing_path_left_verbatim() {
		let vars = json!({ "repository": { "fullName": "octocat/hello" } });
		let message = format_message(RepositoryEvent::Push, &vars);
		assert_eq!(message, "New push to octocat/hello by {{sender}}");
	}

	#[test]
	fn test_null_value_left_verbatim() {
		let vars = json!({ "repository": { "fullName": "octocat/hello" }, "sender": null });
		let message = format_message(RepositoryEvent::Push, &vars);
		assert_eq!(message, "New push to octocat/hello by {{sender}}");
	}

	#[test]
	fn test_missing_intermediate_key_left_verbatim() {
		let vars = json!({ "sender": "octocat" });
		let message = format_message(RepositoryEvent::Push, &vars);
		assert_eq!(message, "New push to {{repository.fullName}} by octocat");
	}

	#[test]
	fn test_event_without_template_falls_back_to_default() {
		let vars = json!({
			"user": { "username": "octocat" },
			"repository": { "name": "hello", "url": "https://example.com/hello" }
		});
		let starred = format_message(RepositoryEvent::Star, &vars);
		let added = format_message(RepositoryEvent::RepositoryAdded, &vars);
		assert_eq!(starred, added);
	}

	#[test]
	fn test_formatting_is_deterministic() {
		let vars = push_vars();
		let a = format_message(RepositoryEvent::Push, &vars);
		let b = format_message(RepositoryEvent::Push, &vars);
		assert_eq!(a, b);
	}

	#[test]
	fn test_numeric_values_are_rendered() {
		let message = format_template("repo #{{repository.id}}", &push_vars());
		assert_eq!(message, "repo #7");
	}

	#[test]
	fn test_unterminated_placeholder_preserved() {
		let message = format_template("hello {{sender", &push_vars());
		assert_eq!(message, "hello {{sender");
	}

	#[test]
	fn test_placeholder_path_is_trimmed() {
		let message = format_template("by {{ sender }}", &push_vars());
		assert_eq!(message, "by octocat");
	}
}

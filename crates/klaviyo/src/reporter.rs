// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Failure reporting seam.
//!
//! Every failed operation, local or remote, is handed to the client's
//! [`FailureReporter`] before the error is returned. The default
//! [`TracingReporter`] emits one `tracing` error event per failure; tests and
//! embedding applications can install their own.

use std::fmt;

use serde_json::Value;
use tracing::error;

/// The client operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	Track,
	TrackOnce,
	Identify,
	Lists,
	AddToList,
	AddToSmsList,
	GetProfile,
	UpdateProfile,
}

impl Operation {
	pub fn as_str(self) -> &'static str {
		match self {
			Operation::Track => "track",
			Operation::TrackOnce => "track_once",
			Operation::Identify => "identify",
			Operation::Lists => "lists",
			Operation::AddToList => "add_to_list",
			Operation::AddToSmsList => "add_to_sms_list",
			Operation::GetProfile => "get_profile",
			Operation::UpdateProfile => "update_profile",
		}
	}

	/// Endpoint path relative to the base URL.
	pub fn endpoint(self) -> &'static str {
		match self {
			Operation::Track | Operation::TrackOnce => "api/events",
			Operation::Identify => "api/profile-import",
			Operation::Lists => "api/lists",
			Operation::AddToList | Operation::AddToSmsList => {
				"api/profile-subscription-bulk-create-jobs/"
			}
			Operation::GetProfile | Operation::UpdateProfile => "api/profiles/{id}",
		}
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single failed call.
///
/// `status` is `None` for failures detected before a request was sent.
#[derive(Debug, Clone, Copy)]
pub struct Failure<'a> {
	pub operation: Operation,
	pub payload: Option<&'a Value>,
	pub status: Option<u16>,
	pub message: &'a str,
}

/// Receives failures from the client.
pub trait FailureReporter: Send + Sync {
	fn report(&self, failure: &Failure<'_>);
}

/// Reports failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
	fn report(&self, failure: &Failure<'_>) {
		let payload = failure.payload.map(Value::to_string).unwrap_or_default();
		error!(
			operation = %failure.operation,
			endpoint = failure.operation.endpoint(),
			status = failure.status,
			payload = %payload,
			message = failure.message,
			"Klaviyo API call failed"
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn operations_map_to_endpoints() {
		assert_eq!(Operation::Track.endpoint(), "api/events");
		assert_eq!(Operation::TrackOnce.endpoint(), "api/events");
		assert_eq!(Operation::Identify.endpoint(), "api/profile-import");
		assert_eq!(
			Operation::AddToSmsList.endpoint(),
			"api/profile-subscription-bulk-create-jobs/"
		);
		assert_eq!(Operation::UpdateProfile.to_string(), "update_profile");
	}

	#[test]
	fn tracing_reporter_accepts_all_shapes() {
		let payload = json!({"data": {}});
		TracingReporter.report(&Failure {
			operation: Operation::Identify,
			payload: Some(&payload),
			status: Some(409),
			message: "duplicate",
		});
		TracingReporter.report(&Failure {
			operation: Operation::Track,
			payload: None,
			status: None,
			message: "You must identify a user by email or ID",
		});
	}
}

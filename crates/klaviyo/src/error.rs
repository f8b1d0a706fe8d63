// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Klaviyo client.

use std::fmt;

use klaviyo_core::{ApiErrorDocument, ApiErrorKind, CoreError};
use thiserror::Error;

use crate::config::ConfigError;

/// A non-success response from the Klaviyo API.
#[derive(Debug, Clone)]
pub struct ApiFailure {
	pub status: u16,
	pub kind: ApiErrorKind,
	pub document: ApiErrorDocument,
	/// Raw response body, kept for bodies that are not a JSON error document.
	pub body: String,
}

impl ApiFailure {
	pub fn from_response(status: u16, body: String) -> Self {
		let document = ApiErrorDocument::parse(&body);
		let kind = ApiErrorKind::classify(status, &document);
		Self {
			status,
			kind,
			document,
			body,
		}
	}

	pub fn kind(&self) -> ApiErrorKind {
		self.kind
	}

	/// Human readable message: the first error detail, or the raw body.
	pub fn message(&self) -> &str {
		self.document.message().unwrap_or(&self.body)
	}
}

impl fmt::Display for ApiFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {:?}): {}", self.status, self.kind, self.message())
	}
}

/// Klaviyo client errors.
#[derive(Debug, Error)]
pub enum KlaviyoError {
	/// Tracking requires an email or an id. Raised before any request is sent.
	#[error("You must identify a user by email or ID")]
	MissingIdentifier,

	/// Profile import requires an email. Raised before any request is sent.
	#[error("You must identify a user by email")]
	MissingEmail,

	/// Another argument failed a local check.
	#[error("invalid argument: {0}")]
	Validation(String),

	#[error("invalid API key: must not be empty")]
	InvalidApiKey,

	#[error("invalid base URL: {0}")]
	InvalidBaseUrl(String),

	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	/// HTTP transport failure (connect, timeout, TLS, body read).
	#[error("HTTP request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("Klaviyo API error {0}")]
	Api(ApiFailure),

	/// A success status with a body that could not be decoded.
	#[error("invalid response from Klaviyo: {0}")]
	InvalidResponse(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl KlaviyoError {
	/// HTTP status of an API failure.
	pub fn status(&self) -> Option<u16> {
		match self {
			KlaviyoError::Api(failure) => Some(failure.status),
			_ => None,
		}
	}

	pub fn api_failure(&self) -> Option<&ApiFailure> {
		match self {
			KlaviyoError::Api(failure) => Some(failure),
			_ => None,
		}
	}

	/// True for errors raised before any request was sent.
	pub fn is_local(&self) -> bool {
		matches!(
			self,
			KlaviyoError::MissingIdentifier
				| KlaviyoError::MissingEmail
				| KlaviyoError::Validation(_)
				| KlaviyoError::InvalidApiKey
				| KlaviyoError::InvalidBaseUrl(_)
				| KlaviyoError::Config(_)
		)
	}
}

impl From<CoreError> for KlaviyoError {
	fn from(err: CoreError) -> Self {
		match err {
			CoreError::MissingIdentifier => KlaviyoError::MissingIdentifier,
			CoreError::MissingEmail => KlaviyoError::MissingEmail,
			CoreError::EmptyField(_) | CoreError::DotSegment(_) => {
				KlaviyoError::Validation(err.to_string())
			}
		}
	}
}

/// Result type alias for Klaviyo operations.
pub type Result<T> = std::result::Result<T, KlaviyoError>;

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn api_failure_classifies_body() {
		let body = json!({"errors": [{"status": 409, "code": "duplicate_profile", "detail": "exists"}]});
		let failure = ApiFailure::from_response(409, body.to_string());

		assert_eq!(failure.kind(), ApiErrorKind::DuplicateProfile);
		assert_eq!(failure.message(), "exists");
	}

	#[test]
	fn api_failure_message_falls_back_to_body() {
		let failure = ApiFailure::from_response(502, "Bad Gateway".to_string());
		assert_eq!(failure.kind(), ApiErrorKind::Server);
		assert_eq!(failure.message(), "Bad Gateway");
	}

	#[test]
	fn api_error_display_includes_status_and_message() {
		let err = KlaviyoError::Api(ApiFailure::from_response(404, String::new()));
		let text = err.to_string();
		assert!(text.contains("404"), "{text}");
		assert!(text.contains("NotFound"), "{text}");
		assert_eq!(err.status(), Some(404));
	}

	#[test]
	fn core_errors_map_to_local_errors() {
		let err = KlaviyoError::from(CoreError::MissingIdentifier);
		assert!(matches!(err, KlaviyoError::MissingIdentifier));
		assert!(err.is_local());

		let err = KlaviyoError::from(CoreError::EmptyField("list_id"));
		assert!(matches!(err, KlaviyoError::Validation(ref m) if m == "list_id must not be empty"));
	}

	#[test]
	fn remote_errors_are_not_local() {
		let err = KlaviyoError::Api(ApiFailure::from_response(500, String::new()));
		assert!(!err.is_local());
		assert!(err.api_failure().is_some());
	}
}

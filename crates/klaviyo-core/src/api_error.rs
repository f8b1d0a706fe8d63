// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structured error documents returned by the Klaviyo API.
//!
//! A failed request carries a JSON:API error body:
//!
//! ```json
//! {"errors": [{"id": "...", "status": 409, "code": "duplicate_profile",
//!              "title": "Conflict.", "detail": "A profile already exists...",
//!              "meta": {"duplicate_profile_id": "01H..."}}]}
//! ```
//!
//! [`ApiErrorKind::classify`] maps the status and error codes onto the
//! handful of cases callers act on.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Error code Klaviyo uses when a profile import collides with an existing profile.
pub const DUPLICATE_PROFILE_CODE: &str = "duplicate_profile";

/// Error code for a phone number Klaviyo refuses to store.
pub const INVALID_PHONE_NUMBER_CODE: &str = "invalid_phone_number";

// Klaviyo reports SMS-ineligible numbers under the generic `invalid` code,
// so the detail text is the only distinguishing field.
const SMS_INELIGIBLE_DETAIL: &str = "ineligible to receive sms";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pointer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parameter: Option<String>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(
		default,
		deserialize_with = "status_code",
		skip_serializing_if = "Option::is_none"
	)]
	pub status: Option<u16>,
	#[serde(default)]
	pub code: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<ErrorSource>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<Map<String, Value>>,
}

impl ApiError {
	fn reports_sms_ineligible(&self) -> bool {
		self.code == INVALID_PHONE_NUMBER_CODE
			|| self
				.detail
				.as_deref()
				.is_some_and(|d| d.to_lowercase().contains(SMS_INELIGIBLE_DETAIL))
	}
}

// Klaviyo sends `status` as a number; some gateways send it as a string.
fn status_code<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
		Some(Value::String(s)) => s.parse().ok(),
		_ => None,
	})
}

/// The `{"errors": [...]}` body of a failed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDocument {
	#[serde(default)]
	pub errors: Vec<ApiError>,
}

impl ApiErrorDocument {
	/// Parses a response body. Bodies that are not a JSON error document
	/// (HTML error pages, empty bodies) yield an empty document.
	pub fn parse(body: &str) -> Self {
		serde_json::from_str(body).unwrap_or_default()
	}

	pub fn has_code(&self, code: &str) -> bool {
		self.errors.iter().any(|e| e.code == code)
	}

	/// Id of the existing profile reported by a `duplicate_profile` error.
	pub fn duplicate_profile_id(&self) -> Option<&str> {
		self
			.errors
			.iter()
			.filter(|e| e.code == DUPLICATE_PROFILE_CODE)
			.find_map(|e| e.meta.as_ref()?.get("duplicate_profile_id")?.as_str())
	}

	/// The first error's detail, falling back to its title.
	pub fn message(&self) -> Option<&str> {
		let first = self.errors.first()?;
		first.detail.as_deref().or(first.title.as_deref())
	}
}

/// Why a profile import was retried without its phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneRetry {
	/// Another profile already owns the phone number.
	DuplicatePhoneNumber,
	/// The phone number does not exist or cannot receive SMS.
	InvalidPhoneNumber,
}

impl PhoneRetry {
	/// Custom property set on the retried profile.
	pub fn marker_property(self) -> &'static str {
		match self {
			PhoneRetry::DuplicatePhoneNumber => "duplicate_phone_number",
			PhoneRetry::InvalidPhoneNumber => "invalid_phone_number",
		}
	}
}

/// Categorised API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
	/// `409` with a `duplicate_profile` error.
	DuplicateProfile,
	/// `400` rejecting the phone number as nonexistent or not SMS capable.
	SmsIneligiblePhone,
	/// `401` or `403`.
	Unauthorized,
	/// `404`.
	NotFound,
	/// `429`.
	RateLimited,
	/// `5xx`.
	Server,
	Other,
}

impl ApiErrorKind {
	pub fn classify(status: u16, document: &ApiErrorDocument) -> Self {
		match status {
			409 if document.has_code(DUPLICATE_PROFILE_CODE) => ApiErrorKind::DuplicateProfile,
			400 if document.errors.iter().any(ApiError::reports_sms_ineligible) => {
				ApiErrorKind::SmsIneligiblePhone
			}
			401 | 403 => ApiErrorKind::Unauthorized,
			404 => ApiErrorKind::NotFound,
			429 => ApiErrorKind::RateLimited,
			500..=599 => ApiErrorKind::Server,
			_ => ApiErrorKind::Other,
		}
	}

	/// The phone retry this failure calls for, if any.
	pub fn phone_retry(self) -> Option<PhoneRetry> {
		match self {
			ApiErrorKind::DuplicateProfile => Some(PhoneRetry::DuplicatePhoneNumber),
			ApiErrorKind::SmsIneligiblePhone => Some(PhoneRetry::InvalidPhoneNumber),
			_ => None,
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event payloads for `POST /api/events`.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, Resource};
use crate::error::CoreError;
use crate::properties::Properties;
use crate::validate::is_blank;

/// `strftime` pattern for the event `time` attribute, e.g. `2024-03-01T12:30:00-0500`.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Every event is recorded in this currency.
pub const VALUE_CURRENCY: &str = "USD";

/// Event property that asks Klaviyo to record the event at most once.
pub const TRACK_ONCE_PROPERTY: &str = "__track_once__";

/// Formats an event timestamp, keeping the caller's UTC offset.
pub fn format_event_time(time: &DateTime<FixedOffset>) -> String {
	time.format(EVENT_TIME_FORMAT).to_string()
}

/// Caller-supplied options for tracking an event.
///
/// At least one of `id` or `email` must be non-blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackOptions {
	pub id: Option<String>,
	pub email: Option<String>,
	pub properties: Properties,
	pub customer_properties: Properties,
	pub time: Option<DateTime<FixedOffset>>,
}

impl TrackOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	pub fn properties(mut self, properties: Properties) -> Self {
		self.properties = properties;
		self
	}

	pub fn customer_properties(mut self, properties: Properties) -> Self {
		self.customer_properties = properties;
		self
	}

	/// Sets the event time. The offset of `time` is preserved in the payload.
	pub fn time<Tz: TimeZone>(mut self, time: DateTime<Tz>) -> Self {
		self.time = Some(time.fixed_offset());
		self
	}

	pub fn has_identifier(&self) -> bool {
		!is_blank(self.id.as_deref()) || !is_blank(self.email.as_deref())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAttributes {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttributes {
	pub properties: Properties,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time: Option<String>,
	pub value: Value,
	pub value_currency: String,
	pub metric: Document<Resource<MetricAttributes>>,
	pub profile: Document<Resource<Properties>>,
}

/// The full request body for `POST /api/events`.
pub type EventDocument = Document<Resource<EventAttributes>>;

impl EventDocument {
	/// Builds the event document, failing locally if the profile cannot be
	/// identified.
	pub fn event(name: &str, options: TrackOptions) -> Result<Self, CoreError> {
		if !options.has_identifier() {
			return Err(CoreError::MissingIdentifier);
		}
		if is_blank(Some(name)) {
			return Err(CoreError::EmptyField("event"));
		}

		let TrackOptions {
			id,
			email,
			properties,
			mut customer_properties,
			time,
		} = options;

		if let Some(email) = email.filter(|e| !is_blank(Some(e))) {
			customer_properties.set("email", email);
		}
		if let Some(id) = id.filter(|i| !is_blank(Some(i))) {
			customer_properties.set("id", id);
		}

		let value = match properties.get("value") {
			Some(Value::Null) | None => Value::from(0),
			Some(v) => v.clone(),
		};

		let attributes = EventAttributes {
			properties,
			time: time.as_ref().map(format_event_time),
			value,
			value_currency: VALUE_CURRENCY.to_string(),
			metric: Document::new(Resource::new(
				"metric",
				MetricAttributes {
					name: name.to_string(),
				},
			)),
			profile: Document::new(Resource::new("profile", customer_properties)),
		};

		Ok(Document::new(Resource::new("event", attributes)))
	}

	/// Like [`EventDocument::event`], flagged so Klaviyo records it at most once.
	pub fn event_once(name: &str, mut options: TrackOptions) -> Result<Self, CoreError> {
		options.properties.set(TRACK_ONCE_PROPERTY, true);
		Self::event(name, options)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{NaiveDate, Utc};
	use serde_json::json;

	fn march_first(offset: FixedOffset) -> DateTime<FixedOffset> {
		let naive = NaiveDate::from_ymd_opt(2024, 3, 1)
			.unwrap()
			.and_hms_opt(12, 30, 0)
			.unwrap();
		offset.from_local_datetime(&naive).unwrap()
	}

	#[test]
	fn formats_time_with_negative_offset() {
		let time = march_first(FixedOffset::west_opt(5 * 3600).unwrap());
		assert_eq!(format_event_time(&time), "2024-03-01T12:30:00-0500");
	}

	#[test]
	fn formats_time_in_utc() {
		let time = march_first(FixedOffset::east_opt(0).unwrap());
		assert_eq!(format_event_time(&time), "2024-03-01T12:30:00+0000");
	}

	#[test]
	fn options_time_keeps_offset_of_utc_datetime() {
		let utc = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
		let options = TrackOptions::new().time(utc);
		assert_eq!(
			format_event_time(&options.time.unwrap()),
			"2023-12-31T23:59:59+0000"
		);
	}

	#[test]
	fn rejects_missing_identifier() {
		let result = EventDocument::event("Placed Order", TrackOptions::new());
		assert_eq!(result.unwrap_err(), CoreError::MissingIdentifier);

		let blank = TrackOptions::new().email("").id("  ");
		let result = EventDocument::event("Placed Order", blank);
		assert_eq!(result.unwrap_err(), CoreError::MissingIdentifier);
	}

	#[test]
	fn rejects_blank_event_name() {
		let result = EventDocument::event(" ", TrackOptions::new().email("a@b.com"));
		assert_eq!(result.unwrap_err(), CoreError::EmptyField("event"));
	}

	#[test]
	fn builds_full_event_document() {
		let options = TrackOptions::new()
			.email("a@b.com")
			.id("cust-1")
			.properties(Properties::new().insert("value", 42.5).insert("sku", "X1"))
			.customer_properties(Properties::new().insert("first_name", "Ada"))
			.time(march_first(FixedOffset::east_opt(3600).unwrap()));

		let doc = EventDocument::event("Placed Order", options).unwrap();
		let value = serde_json::to_value(&doc).unwrap();

		assert_eq!(
			value,
			json!({
				"data": {
					"type": "event",
					"attributes": {
						"properties": {"value": 42.5, "sku": "X1"},
						"time": "2024-03-01T12:30:00+0100",
						"value": 42.5,
						"value_currency": "USD",
						"metric": {"data": {"type": "metric", "attributes": {"name": "Placed Order"}}},
						"profile": {"data": {"type": "profile", "attributes": {
							"first_name": "Ada",
							"email": "a@b.com",
							"id": "cust-1"
						}}}
					}
				}
			})
		);
	}

	#[test]
	fn value_defaults_to_zero_and_time_is_omitted() {
		let doc = EventDocument::event("Viewed", TrackOptions::new().id("42")).unwrap();
		let value = serde_json::to_value(&doc).unwrap();
		let attributes = &value["data"]["attributes"];

		assert_eq!(attributes["value"], json!(0));
		assert!(attributes.get("time").is_none());
		assert_eq!(attributes["profile"]["data"]["attributes"], json!({"id": "42"}));
	}

	#[test]
	fn identifier_overrides_customer_property() {
		let options = TrackOptions::new()
			.email("real@b.com")
			.customer_properties(Properties::new().insert("email", "stale@b.com"));
		let doc = EventDocument::event("Viewed", options).unwrap();
		assert_eq!(
			doc.data.attributes.profile.data.attributes.get("email"),
			Some(&json!("real@b.com"))
		);
	}

	#[test]
	fn event_once_sets_flag_property() {
		let doc = EventDocument::event_once("Signed Up", TrackOptions::new().email("a@b.com")).unwrap();
		assert_eq!(
			doc.data.attributes.properties.get(TRACK_ONCE_PROPERTY),
			Some(&json!(true))
		);
	}
}

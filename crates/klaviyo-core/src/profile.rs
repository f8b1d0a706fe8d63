// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile payloads for `POST /api/profile-import` and `/api/profiles/{id}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api_error::PhoneRetry;
use crate::document::{Document, Resource};
use crate::error::CoreError;
use crate::properties::Properties;
use crate::validate::{is_blank, require_path_segment};

/// Postal location of a profile. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address1: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address2: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub country: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub zip: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timezone: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ip: Option<String>,
}

/// Standard profile attributes accepted by the profile import endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileAttributes {
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<Location>,
}

impl ProfileAttributes {
	pub fn new(email: impl Into<String>) -> Self {
		Self {
			email: email.into(),
			..Default::default()
		}
	}

	pub fn phone_number(mut self, phone: impl Into<String>) -> Self {
		self.phone_number = Some(phone.into());
		self
	}

	pub fn first_name(mut self, name: impl Into<String>) -> Self {
		self.first_name = Some(name.into());
		self
	}

	pub fn last_name(mut self, name: impl Into<String>) -> Self {
		self.last_name = Some(name.into());
		self
	}

	pub fn location(mut self, location: Location) -> Self {
		self.location = Some(location);
		self
	}
}

/// Attributes of a profile import: the standard fields plus custom properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileImport {
	#[serde(flatten)]
	pub attributes: ProfileAttributes,
	pub properties: Properties,
}

pub type ProfileImportDocument = Document<Resource<ProfileImport>>;

impl ProfileImportDocument {
	/// Builds an import document. The email is required.
	pub fn import(attributes: ProfileAttributes, properties: Properties) -> Result<Self, CoreError> {
		if is_blank(Some(&attributes.email)) {
			return Err(CoreError::MissingEmail);
		}

		Ok(Document::new(Resource::new(
			"profile",
			ProfileImport {
				attributes,
				properties,
			},
		)))
	}

	pub fn has_phone_number(&self) -> bool {
		!is_blank(self.data.attributes.attributes.phone_number.as_deref())
	}

	/// Drops the phone number and records why in the custom properties.
	///
	/// Returns the removed phone number, if any.
	pub fn strip_phone_number(&mut self, reason: PhoneRetry) -> Option<String> {
		let import = &mut self.data.attributes;
		import.properties.set(reason.marker_property(), true);
		import.attributes.phone_number.take()
	}
}

pub type ProfileUpdateDocument = Document<Resource<Properties>>;

impl ProfileUpdateDocument {
	/// Builds the body for `PATCH /api/profiles/{id}`.
	pub fn update(id: &str, attributes: Properties) -> Result<Self, CoreError> {
		let id = require_path_segment("profile id", id)?;
		Ok(Document::new(Resource::new("profile", attributes).with_id(id)))
	}
}

/// A profile as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
	pub id: String,
	#[serde(default)]
	pub attributes: Value,
}

impl ProfileRecord {
	pub fn email(&self) -> Option<&str> {
		self.attributes.get("email").and_then(Value::as_str)
	}

	pub fn phone_number(&self) -> Option<&str> {
		self.attributes.get("phone_number").and_then(Value::as_str)
	}

	pub fn properties(&self) -> Properties {
		self
			.attributes
			.get("properties")
			.cloned()
			.map(Properties::from)
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn import_requires_email() {
		let result = ProfileImportDocument::import(ProfileAttributes::new(""), Properties::new());
		assert_eq!(result.unwrap_err(), CoreError::MissingEmail);

		let result = ProfileImportDocument::import(
			ProfileAttributes::new("   ").phone_number("+15551234567"),
			Properties::new(),
		);
		assert_eq!(result.unwrap_err(), CoreError::MissingEmail);
	}

	#[test]
	fn import_serializes_flat_attributes() {
		let attributes = ProfileAttributes::new("a@b.com")
			.phone_number("+15551234567")
			.first_name("Ada")
			.location(Location {
				city: Some("Boston".to_string()),
				..Default::default()
			});
		let doc = ProfileImportDocument::import(attributes, Properties::new().insert("plan", "pro")).unwrap();

		assert_eq!(
			serde_json::to_value(&doc).unwrap(),
			json!({
				"data": {
					"type": "profile",
					"attributes": {
						"email": "a@b.com",
						"phone_number": "+15551234567",
						"first_name": "Ada",
						"location": {"city": "Boston"},
						"properties": {"plan": "pro"}
					}
				}
			})
		);
	}

	#[test]
	fn strip_phone_number_adds_marker() {
		let mut doc = ProfileImportDocument::import(
			ProfileAttributes::new("a@b.com").phone_number("+15551234567"),
			Properties::new(),
		)
		.unwrap();
		assert!(doc.has_phone_number());

		let removed = doc.strip_phone_number(PhoneRetry::DuplicatePhoneNumber);

		assert_eq!(removed.as_deref(), Some("+15551234567"));
		assert!(!doc.has_phone_number());
		let value = serde_json::to_value(&doc).unwrap();
		assert!(value["data"]["attributes"].get("phone_number").is_none());
		assert_eq!(
			value["data"]["attributes"]["properties"]["duplicate_phone_number"],
			json!(true)
		);
	}

	#[test]
	fn update_document_carries_id() {
		let doc = ProfileUpdateDocument::update("01H", Properties::new().insert("first_name", "Ada")).unwrap();
		assert_eq!(
			serde_json::to_value(&doc).unwrap(),
			json!({"data": {"type": "profile", "id": "01H", "attributes": {"first_name": "Ada"}}})
		);
	}

	#[test]
	fn update_rejects_blank_id() {
		let result = ProfileUpdateDocument::update("", Properties::new());
		assert_eq!(result.unwrap_err(), CoreError::EmptyField("profile id"));

		let result = ProfileUpdateDocument::update("..", Properties::new());
		assert_eq!(result.unwrap_err(), CoreError::DotSegment("profile id"));
	}

	#[test]
	fn record_accessors_read_attributes() {
		let doc: Document<ProfileRecord> = serde_json::from_value(json!({
			"data": {
				"type": "profile",
				"id": "01H",
				"attributes": {
					"email": "a@b.com",
					"phone_number": null,
					"properties": {"plan": "pro"}
				}
			}
		}))
		.unwrap();

		assert_eq!(doc.data.id, "01H");
		assert_eq!(doc.data.email(), Some("a@b.com"));
		assert_eq!(doc.data.phone_number(), None);
		assert_eq!(doc.data.properties().get("plan"), Some(&json!("pro")));
	}
}

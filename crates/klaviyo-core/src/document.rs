// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic JSON:API envelopes.
//!
//! Every Klaviyo request and response body is wrapped as `{"data": ...}`,
//! where `data` is either a single resource or an array of them.

use serde::{Deserialize, Serialize};

/// Top-level `{"data": T}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
	pub data: T,
}

impl<T> Document<T> {
	pub fn new(data: T) -> Self {
		Self { data }
	}
}

/// A typed resource object with attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<A> {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub attributes: A,
}

impl<A> Resource<A> {
	pub fn new(kind: impl Into<String>, attributes: A) -> Self {
		Self {
			kind: kind.into(),
			id: None,
			attributes,
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}
}

/// A resource identifier used inside relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
	#[serde(rename = "type")]
	pub kind: String,
	pub id: String,
}

impl ResourceRef {
	pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			id: id.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn resource_without_id_omits_field() {
		let resource = Resource::new("metric", json!({"name": "Viewed Product"}));
		let value = serde_json::to_value(Document::new(resource)).unwrap();

		assert_eq!(
			value,
			json!({"data": {"type": "metric", "attributes": {"name": "Viewed Product"}}})
		);
	}

	#[test]
	fn resource_with_id_serializes_id() {
		let resource = Resource::new("profile", json!({})).with_id("01ABC");
		let value = serde_json::to_value(&resource).unwrap();
		assert_eq!(value["id"], "01ABC");
	}

	#[test]
	fn resource_deserializes_without_id() {
		let resource: Resource<serde_json::Value> =
			serde_json::from_value(json!({"type": "list", "attributes": {}})).unwrap();
		assert_eq!(resource.kind, "list");
		assert!(resource.id.is_none());
	}
}

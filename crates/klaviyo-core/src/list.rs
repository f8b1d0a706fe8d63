// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Response types for `GET /api/lists`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::document::{Document, Resource};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListAttributes {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub created: Option<DateTime<FixedOffset>>,
	#[serde(default)]
	pub updated: Option<DateTime<FixedOffset>>,
	#[serde(default)]
	pub opt_in_process: Option<String>,
}

/// One page of lists as returned by the API.
pub type ListCollection = Document<Vec<Resource<ListAttributes>>>;

/// A marketing list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
	pub id: String,
	pub name: String,
	pub created: Option<DateTime<FixedOffset>>,
	pub updated: Option<DateTime<FixedOffset>>,
	pub opt_in_process: Option<String>,
}

impl ListCollection {
	/// Flattens the page into lists, skipping resources without an id.
	pub fn into_lists(self) -> Vec<List> {
		self
			.data
			.into_iter()
			.filter_map(|resource| {
				let id = resource.id?;
				let ListAttributes {
					name,
					created,
					updated,
					opt_in_process,
				} = resource.attributes;
				Some(List {
					id,
					name,
					created,
					updated,
					opt_in_process,
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn parses_list_page() {
		let page: ListCollection = serde_json::from_value(json!({
			"data": [
				{
					"type": "list",
					"id": "Y6nRLr",
					"attributes": {
						"name": "Newsletter",
						"created": "2024-01-05T10:00:00+00:00",
						"updated": "2024-02-01T08:30:00+00:00",
						"opt_in_process": "double_opt_in"
					},
					"relationships": {},
					"links": {"self": "https://a.klaviyo.com/api/lists/Y6nRLr/"}
				},
				{"type": "list", "id": "SMS1", "attributes": {"name": "SMS"}}
			],
			"links": {"self": "https://a.klaviyo.com/api/lists/", "next": null}
		}))
		.unwrap();

		let lists = page.into_lists();
		assert_eq!(lists.len(), 2);
		assert_eq!(lists[0].id, "Y6nRLr");
		assert_eq!(lists[0].name, "Newsletter");
		assert_eq!(lists[0].opt_in_process.as_deref(), Some("double_opt_in"));
		assert!(lists[0].created.is_some());
		assert_eq!(lists[1].name, "SMS");
		assert!(lists[1].updated.is_none());
	}

	#[test]
	fn empty_page_yields_no_lists() {
		let page: ListCollection = serde_json::from_value(json!({"data": []})).unwrap();
		assert!(page.into_lists().is_empty());
	}
}

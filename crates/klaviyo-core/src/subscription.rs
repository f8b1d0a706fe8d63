// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bulk subscription job payloads for
//! `POST /api/profile-subscription-bulk-create-jobs/`.
//!
//! Jobs are processed asynchronously by Klaviyo; a `202 Accepted` only means
//! the job was queued.

use serde::{Deserialize, Serialize};

use crate::document::{Document, Resource, ResourceRef};
use crate::error::CoreError;
use crate::validate::require_non_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentStatus {
	Subscribed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingConsent {
	pub consent: ConsentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSubscription {
	pub marketing: MarketingConsent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriptions {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sms: Option<ChannelSubscription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberAttributes {
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subscriptions: Option<Subscriptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionJobAttributes {
	pub profiles: Document<Vec<Resource<SubscriberAttributes>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRelationship {
	pub list: Document<ResourceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionJob {
	#[serde(rename = "type")]
	pub kind: String,
	pub attributes: SubscriptionJobAttributes,
	pub relationships: ListRelationship,
}

pub type SubscriptionJobDocument = Document<SubscriptionJob>;

impl SubscriptionJobDocument {
	/// A job that adds one email-only profile to a list.
	pub fn email(email: &str, list_id: &str) -> Result<Self, CoreError> {
		let email = require_non_blank("email", email)?;
		Self::job(
			SubscriberAttributes {
				email: email.to_string(),
				phone_number: None,
				subscriptions: None,
			},
			list_id,
		)
	}

	/// A job that adds a profile to a list with SMS marketing consent.
	pub fn sms(phone_number: &str, email: &str, list_id: &str) -> Result<Self, CoreError> {
		let phone_number = require_non_blank("phone number", phone_number)?;
		let email = require_non_blank("email", email)?;
		Self::job(
			SubscriberAttributes {
				email: email.to_string(),
				phone_number: Some(phone_number.to_string()),
				subscriptions: Some(Subscriptions {
					sms: Some(ChannelSubscription {
						marketing: MarketingConsent {
							consent: ConsentStatus::Subscribed,
						},
					}),
				}),
			},
			list_id,
		)
	}

	fn job(subscriber: SubscriberAttributes, list_id: &str) -> Result<Self, CoreError> {
		let list_id = require_non_blank("list_id", list_id)?;
		Ok(Document::new(SubscriptionJob {
			kind: "profile-subscription-bulk-create-job".to_string(),
			attributes: SubscriptionJobAttributes {
				profiles: Document::new(vec![Resource::new("profile", subscriber)]),
			},
			relationships: ListRelationship {
				list: Document::new(ResourceRef::new("list", list_id)),
			},
		}))
	}

	/// The single subscriber carried by this job.
	pub fn subscriber(&self) -> Option<&SubscriberAttributes> {
		self
			.data
			.attributes
			.profiles
			.data
			.first()
			.map(|profile| &profile.attributes)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command-line arguments.

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};
use klaviyo::{ProfileAttributes, Properties, TrackOptions};
use serde_json::Value;

/// Klaviyo command-line client.
#[derive(Parser, Debug)]
#[command(name = "klaviyo", about = "Track events and manage Klaviyo profiles and lists", version)]
pub struct Cli {
	/// Private API key. When unset, KLAVIYO_API_KEY_FILE or KLAVIYO_API_KEY is used.
	#[arg(long, global = true)]
	pub api_key: Option<String>,

	/// Overrides KLAVIYO_BASE_URL
	#[arg(long, global = true)]
	pub base_url: Option<String>,

	/// API revision sent in the `revision` header. Overrides KLAVIYO_REVISION.
	#[arg(long, global = true)]
	pub revision: Option<String>,

	/// Per-request timeout. Overrides KLAVIYO_TIMEOUT_SECS.
	#[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
	pub timeout_secs: Option<u64>,

	/// Emit logs as JSON lines on stderr
	#[arg(long, global = true)]
	pub log_json: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Record an event against a profile
	Track(TrackArgs),
	/// Record an event at most once per profile
	TrackOnce(TrackArgs),
	/// Create or update a profile
	Identify(IdentifyArgs),
	/// Show the first page of lists
	Lists,
	/// Subscribe an email address to a list
	AddToList {
		#[arg(long)]
		email: String,
		#[arg(long)]
		list_id: String,
	},
	/// Subscribe a phone number to a list with SMS consent
	AddToSmsList {
		#[arg(long)]
		phone_number: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		list_id: String,
	},
	/// Fetch a profile by id
	GetProfile {
		id: String,
	},
	/// Patch attributes of an existing profile
	UpdateProfile {
		id: String,
		/// Profile attributes as a JSON object
		#[arg(long, value_parser = parse_properties)]
		attributes: Properties,
	},
}

#[derive(Args, Debug, Clone)]
pub struct TrackArgs {
	/// Metric name, e.g. "Placed Order"
	pub event: String,

	#[arg(long)]
	pub email: Option<String>,

	/// External id of the profile
	#[arg(long)]
	pub id: Option<String>,

	/// Event properties as a JSON object
	#[arg(long, value_parser = parse_properties)]
	pub properties: Option<Properties>,

	/// Profile properties as a JSON object
	#[arg(long, value_parser = parse_properties)]
	pub customer_properties: Option<Properties>,

	/// Event time in RFC 3339, e.g. 2024-03-01T12:30:00-05:00
	#[arg(long, value_parser = parse_time)]
	pub time: Option<DateTime<FixedOffset>>,
}

impl TrackArgs {
	pub fn into_options(self) -> (String, TrackOptions) {
		let mut options = TrackOptions::new()
			.properties(self.properties.unwrap_or_default())
			.customer_properties(self.customer_properties.unwrap_or_default());
		if let Some(email) = self.email {
			options = options.email(email);
		}
		if let Some(id) = self.id {
			options = options.id(id);
		}
		if let Some(time) = self.time {
			options = options.time(time);
		}
		(self.event, options)
	}
}

#[derive(Args, Debug, Clone)]
pub struct IdentifyArgs {
	#[arg(long)]
	pub email: String,

	#[arg(long)]
	pub phone_number: Option<String>,

	#[arg(long)]
	pub first_name: Option<String>,

	#[arg(long)]
	pub last_name: Option<String>,

	/// Custom profile properties as a JSON object
	#[arg(long, value_parser = parse_properties)]
	pub properties: Option<Properties>,
}

impl IdentifyArgs {
	pub fn into_profile(self) -> (ProfileAttributes, Properties) {
		let mut attributes = ProfileAttributes::new(self.email);
		attributes.phone_number = self.phone_number;
		attributes.first_name = self.first_name;
		attributes.last_name = self.last_name;
		(attributes, self.properties.unwrap_or_default())
	}
}

fn parse_properties(raw: &str) -> Result<Properties, String> {
	match serde_json::from_str::<Value>(raw) {
		Ok(value @ Value::Object(_)) => Ok(Properties::from(value)),
		Ok(_) => Err("expected a JSON object".to_string()),
		Err(e) => Err(format!("invalid JSON: {e}")),
	}
}

fn parse_time(raw: &str) -> Result<DateTime<FixedOffset>, String> {
	DateTime::parse_from_rfc3339(raw).map_err(|e| format!("invalid RFC 3339 time: {e}"))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client construction and fixed request headers.

use reqwest::{Client, ClientBuilder};

pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com/";

/// API revision sent in the `revision` header.
pub const DEFAULT_REVISION: &str = "2024-02-15";

/// Scheme prefix of the `Authorization` header value.
pub const AUTH_SCHEME: &str = "Klaviyo-API-Key";

pub const REVISION_HEADER: &str = "revision";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Returns the User-Agent string, e.g. `klaviyo-rs/0.1.0`.
pub fn user_agent() -> String {
	format!("klaviyo-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// A reqwest builder preconfigured with the standard User-Agent.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_crate_version() {
		let ua = user_agent();
		assert!(ua.starts_with("klaviyo-rs/"));
		assert_eq!(ua.split('/').nth(1), Some(env!("CARGO_PKG_VERSION")));
	}

	#[test]
	fn builder_builds() {
		assert!(builder().build().is_ok());
	}
}

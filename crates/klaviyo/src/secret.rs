// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Private API key wrapper.

use std::fmt;

use zeroize::Zeroize;

/// Placeholder printed wherever the key would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A Klaviyo private API key.
///
/// Debug and Display never print the key, and the memory is zeroed on drop.
/// Use [`ApiKey::expose`] at the single place the key goes on the wire.
///
/// ```
/// use klaviyo::ApiKey;
///
/// let key = ApiKey::new("pk_live_123");
/// assert_eq!(key.to_string(), "[REDACTED]");
/// assert_eq!(key.expose(), "pk_live_123");
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct ApiKey {
	inner: String,
}

impl ApiKey {
	pub fn new(key: impl Into<String>) -> Self {
		Self { inner: key.into() }
	}

	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn is_blank(&self) -> bool {
		self.inner.trim().is_empty()
	}
}

impl From<String> for ApiKey {
	fn from(key: String) -> Self {
		Self::new(key)
	}
}

impl From<&str> for ApiKey {
	fn from(key: &str) -> Self {
		Self::new(key)
	}
}

impl fmt::Debug for ApiKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ApiKey").field(&REDACTED).finish()
	}
}

impl fmt::Display for ApiKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_is_redacted() {
		let key = ApiKey::new("pk_live_abcdef");
		assert_eq!(format!("{key:?}"), "ApiKey(\"[REDACTED]\")");
	}

	#[test]
	fn option_debug_is_redacted() {
		let key = Some(ApiKey::new("pk_live_abcdef"));
		let debug = format!("{key:?}");
		assert!(!debug.contains("pk_live_abcdef"));
	}

	#[test]
	fn blank_detection() {
		assert!(ApiKey::new("").is_blank());
		assert!(ApiKey::new("  ").is_blank());
		assert!(!ApiKey::new("pk").is_blank());
	}

	proptest! {
		#[test]
		fn formatting_never_leaks_key(key in "pk_[a-zA-Z0-9]{8,40}") {
			let api_key = ApiKey::new(key.clone());
			let shown = api_key.to_string();
			let debugged = format!("{:?}", api_key);
			prop_assert!(!shown.contains(&key));
			prop_assert!(!debugged.contains(&key));
			prop_assert_eq!(api_key.expose(), key.as_str());
		}
	}
}

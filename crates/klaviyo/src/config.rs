// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client tuning and environment-based configuration.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `KLAVIYO_API_KEY` | Private API key |
//! | `KLAVIYO_API_KEY_FILE` | Path to a file holding the key (takes precedence) |
//! | `KLAVIYO_BASE_URL` | API base URL, default `https://a.klaviyo.com/` |
//! | `KLAVIYO_REVISION` | API revision header, default `2024-02-15` |
//! | `KLAVIYO_TIMEOUT_SECS` | Per-request timeout in seconds, default 10 |

use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

use thiserror::Error;

use crate::http::DEFAULT_REVISION;
use crate::secret::ApiKey;

pub const API_KEY_VAR: &str = "KLAVIYO_API_KEY";
pub const API_KEY_FILE_VAR: &str = "KLAVIYO_API_KEY_FILE";
pub const BASE_URL_VAR: &str = "KLAVIYO_BASE_URL";
pub const REVISION_VAR: &str = "KLAVIYO_REVISION";
pub const TIMEOUT_VAR: &str = "KLAVIYO_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("API key not found: set either {var} or {file_var}")]
	MissingApiKey { var: String, file_var: String },

	#[error("failed to read secret file at {path}: {source}")]
	SecretFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },

	#[error("invalid value for {var}: {value}")]
	InvalidValue { var: &'static str, value: String },
}

/// Per-client tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	pub request_timeout: Duration,
	pub revision: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: DEFAULT_TIMEOUT,
			revision: DEFAULT_REVISION.to_string(),
		}
	}
}

/// Everything needed to build a client, as read from the environment.
#[derive(Debug, Clone)]
pub struct EnvSettings {
	pub api_key: ApiKey,
	pub base_url: Option<String>,
	pub config: ClientConfig,
}

impl EnvSettings {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|var| env::var(var).ok())
	}

	/// Reads settings through `lookup` instead of the process environment.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let api_key = load_secret(&lookup, API_KEY_VAR)?.ok_or_else(|| ConfigError::MissingApiKey {
			var: API_KEY_VAR.to_string(),
			file_var: API_KEY_FILE_VAR.to_string(),
		})?;

		let mut config = ClientConfig::default();
		if let Some(revision) = lookup(REVISION_VAR).filter(|r| !r.trim().is_empty()) {
			config.revision = revision;
		}
		if let Some(raw) = lookup(TIMEOUT_VAR) {
			let secs = raw
				.trim()
				.parse::<u64>()
				.ok()
				.filter(|secs| *secs > 0)
				.ok_or_else(|| ConfigError::InvalidValue {
					var: TIMEOUT_VAR,
					value: raw.clone(),
				})?;
			config.request_timeout = Duration::from_secs(secs);
		}

		Ok(Self {
			api_key,
			base_url: lookup(BASE_URL_VAR).filter(|u| !u.trim().is_empty()),
			config,
		})
	}
}

/// `{var}_FILE` wins over `{var}`. One trailing newline is stripped from files.
fn load_secret<F>(lookup: &F, var: &str) -> Result<Option<ApiKey>, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");

	if let Some(path) = lookup(&file_var) {
		if path.is_empty() {
			return Err(ConfigError::EmptyPath { var: file_var });
		}
		let path = PathBuf::from(path);
		let content = fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
			path: path.clone(),
			source,
		})?;
		let key = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(ApiKey::new(key)));
	}

	Ok(lookup(var).map(ApiKey::new))
}

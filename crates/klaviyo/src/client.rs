// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Klaviyo API client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use klaviyo_core::{
	require_path_segment, CoreError, Document, EventDocument, List, ListCollection, PhoneRetry,
	ProfileAttributes, ProfileImportDocument, ProfileRecord, ProfileUpdateDocument, Properties,
	SubscriptionJobDocument, TrackOptions,
};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{ClientConfig, EnvSettings};
use crate::error::{ApiFailure, KlaviyoError, Result};
use crate::http::{self, AUTH_SCHEME, DEFAULT_BASE_URL, JSON_CONTENT_TYPE, REVISION_HEADER};
use crate::reporter::{Failure, FailureReporter, Operation, TracingReporter};
use crate::secret::ApiKey;

/// How many times `identify` resubmits a profile without its phone number.
pub const MAX_PHONE_RETRIES: u32 = 1;

/// Result of a successful profile import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyOutcome {
	pub profile_id: String,
	/// `true` when Klaviyo created a new profile (`201`), `false` on update (`200`).
	pub created: bool,
	/// Set when the profile was only accepted after dropping its phone number.
	pub phone_retry: Option<PhoneRetry>,
}

/// Builder for [`KlaviyoClient`].
pub struct KlaviyoClientBuilder {
	api_key: Option<ApiKey>,
	base_url: Option<String>,
	config: ClientConfig,
	reporter: Option<Arc<dyn FailureReporter>>,
	http_client: Option<Client>,
}

impl KlaviyoClientBuilder {
	/// Creates a builder with default settings and no API key.
	pub fn new() -> Self {
		Self {
			api_key: None,
			base_url: None,
			config: ClientConfig::default(),
			reporter: None,
			http_client: None,
		}
	}

	/// Starts from settings read with [`EnvSettings`].
	pub fn from_settings(settings: EnvSettings) -> Self {
		let mut builder = Self::new().api_key(settings.api_key).config(settings.config);
		builder.base_url = settings.base_url;
		builder
	}

	/// Sets the private API key.
	pub fn api_key(mut self, key: impl Into<ApiKey>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets the API base URL. Defaults to `https://a.klaviyo.com/`.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Replaces the timeout and revision settings.
	pub fn config(mut self, config: ClientConfig) -> Self {
		self.config = config;
		self
	}

	/// Sets the `revision` header. Defaults to `2024-02-15`.
	pub fn revision(mut self, revision: impl Into<String>) -> Self {
		self.config.revision = revision.into();
		self
	}

	/// Sets the per-request timeout. Defaults to 10 seconds.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Installs the sink that receives every failed call.
	/// Defaults to [`TracingReporter`].
	pub fn reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
		self.reporter = Some(Arc::new(reporter));
		self
	}

	/// Uses a preconfigured HTTP client. The request timeout is then the
	/// caller's responsibility.
	pub fn http_client(mut self, client: Client) -> Self {
		self.http_client = Some(client);
		self
	}

	/// Builds the client, validating the API key and base URL.
	pub fn build(self) -> Result<KlaviyoClient> {
		let api_key = self.api_key.ok_or(KlaviyoError::InvalidApiKey)?;
		if api_key.is_blank() {
			return Err(KlaviyoError::InvalidApiKey);
		}

		let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

		let http_client = match self.http_client {
			Some(client) => client,
			None => http::builder()
				.timeout(self.config.request_timeout)
				.build()
				.map_err(KlaviyoError::Request)?,
		};

		info!(base_url = %base_url, revision = %self.config.revision, "Klaviyo client initialized");

		Ok(KlaviyoClient {
			api_key,
			base_url,
			revision: self.config.revision,
			http_client,
			reporter: self
				.reporter
				.unwrap_or_else(|| Arc::new(TracingReporter) as Arc<dyn FailureReporter>),
		})
	}
}

impl Default for KlaviyoClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Only http(s) URLs are accepted. A trailing slash is added so endpoint
/// paths join under any path prefix.
fn parse_base_url(raw: &str) -> Result<Url> {
	let trimmed = raw.trim();
	let normalized = if trimmed.ends_with('/') {
		trimmed.to_string()
	} else {
		format!("{trimmed}/")
	};

	let url = Url::parse(&normalized).map_err(|e| KlaviyoError::InvalidBaseUrl(format!("{raw}: {e}")))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(KlaviyoError::InvalidBaseUrl(format!(
			"{raw}: scheme must be http or https"
		)));
	}
	Ok(url)
}

/// Status and body of a completed request.
struct RawResponse {
	status: StatusCode,
	body: String,
}

/// Client for the Klaviyo events, profiles and lists APIs.
///
/// Every operation sends a single request (two for an `identify` that
/// retries without a phone number) and returns a typed result. Failures are
/// passed to the configured [`FailureReporter`] before being returned.
///
/// # Example
///
/// ```ignore
/// use klaviyo::{KlaviyoClient, Properties, TrackOptions};
///
/// let client = KlaviyoClient::builder()
///     .api_key("pk_live_xxx")
///     .build()?;
///
/// client.track("Placed Order", TrackOptions::new()
///     .email("ada@example.com")
///     .properties(Properties::new().insert("value", 29.99))
/// ).await?;
/// ```
#[derive(Clone)]
pub struct KlaviyoClient {
	api_key: ApiKey,
	base_url: Url,
	revision: String,
	http_client: Client,
	reporter: Arc<dyn FailureReporter>,
}

impl fmt::Debug for KlaviyoClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("KlaviyoClient")
			.field("api_key", &self.api_key)
			.field("base_url", &self.base_url.as_str())
			.field("revision", &self.revision)
			.finish_non_exhaustive()
	}
}

impl KlaviyoClient {
	pub fn builder() -> KlaviyoClientBuilder {
		KlaviyoClientBuilder::new()
	}

	/// Builds a client from `KLAVIYO_*` environment variables.
	pub fn from_env() -> Result<Self> {
		let settings = EnvSettings::from_env()?;
		KlaviyoClientBuilder::from_settings(settings).build()
	}

	pub fn base_url(&self) -> &str {
		self.base_url.as_str()
	}

	pub fn revision(&self) -> &str {
		&self.revision
	}

	/// Records `event` against the profile identified by `options.email`
	/// and/or `options.id`.
	///
	/// Fails locally with [`KlaviyoError::MissingIdentifier`] when both are
	/// empty. Succeeds on `202 Accepted`.
	#[instrument(skip(self, options))]
	pub async fn track(&self, event: &str, options: TrackOptions) -> Result<()> {
		let document = EventDocument::event(event, options);
		self.send_event(Operation::Track, document).await
	}

	/// Like [`KlaviyoClient::track`], but Klaviyo records the event at most
	/// once per profile. There is no local deduplication.
	#[instrument(skip(self, options))]
	pub async fn track_once(&self, event: &str, options: TrackOptions) -> Result<()> {
		let document = EventDocument::event_once(event, options);
		self.send_event(Operation::TrackOnce, document).await
	}

	async fn send_event(
		&self,
		operation: Operation,
		document: std::result::Result<EventDocument, CoreError>,
	) -> Result<()> {
		let document = document.map_err(|e| self.reject(operation, e))?;
		let payload = serde_json::to_value(&document)?;
		let url = self.endpoint(operation.endpoint())?;

		let response = self.send(Method::POST, url, Some(&payload)).await?;
		self.expect_status(operation, &payload, response, StatusCode::ACCEPTED)?;
		Ok(())
	}

	/// Creates or updates a profile through the profile import endpoint.
	///
	/// When Klaviyo rejects the phone number, either because another profile
	/// owns it (`409 duplicate_profile`) or because it cannot receive SMS
	/// (`400`), the profile is resubmitted once without the phone number and
	/// with a `duplicate_phone_number` / `invalid_phone_number` marker
	/// property. Caller data is not modified.
	#[instrument(skip(self, attributes, properties))]
	pub async fn identify(
		&self,
		attributes: ProfileAttributes,
		properties: Properties,
	) -> Result<IdentifyOutcome> {
		let operation = Operation::Identify;
		let mut document = ProfileImportDocument::import(attributes, properties)
			.map_err(|e| self.reject(operation, e))?;
		let url = self.endpoint(operation.endpoint())?;

		let mut retries_left = MAX_PHONE_RETRIES;
		let mut phone_retry = None;

		loop {
			let payload = serde_json::to_value(&document)?;
			let response = self.send(Method::POST, url.clone(), Some(&payload)).await?;

			if matches!(response.status, StatusCode::OK | StatusCode::CREATED) {
				let created = response.status == StatusCode::CREATED;
				let record: Document<ProfileRecord> = self.decode(operation, Some(&payload), &response)?;
				return Ok(IdentifyOutcome {
					profile_id: record.data.id,
					created,
					phone_retry,
				});
			}

			let failure = self.api_failure(operation, Some(&payload), response);

			match failure.kind.phone_retry() {
				Some(reason) if retries_left > 0 && document.has_phone_number() => {
					warn!(
						status = failure.status,
						reason = reason.marker_property(),
						"Retrying profile import without phone number"
					);
					document.strip_phone_number(reason);
					retries_left -= 1;
					phone_retry = Some(reason);
				}
				_ => return Err(KlaviyoError::Api(failure)),
			}
		}
	}

	/// Fetches the first page of lists.
	#[instrument(skip(self))]
	pub async fn lists(&self) -> Result<Vec<List>> {
		let operation = Operation::Lists;
		let url = self.endpoint(operation.endpoint())?;

		let response = self.send(Method::GET, url, None).await?;
		let response = self.expect_status(operation, &Value::Null, response, StatusCode::OK)?;
		let page: ListCollection = self.decode(operation, None, &response)?;
		Ok(page.into_lists())
	}

	/// Queues a job subscribing `email` to list `list_id`.
	///
	/// The job runs asynchronously on Klaviyo's side; success only means it
	/// was accepted.
	#[instrument(skip(self, email))]
	pub async fn add_to_list(&self, email: &str, list_id: &str) -> Result<()> {
		let operation = Operation::AddToList;
		let document =
			SubscriptionJobDocument::email(email, list_id).map_err(|e| self.reject(operation, e))?;
		self.submit_subscription(operation, &document).await
	}

	/// Queues a job subscribing a profile to list `list_id` with SMS
	/// marketing consent.
	#[instrument(skip(self, phone_number, email))]
	pub async fn add_to_sms_list(&self, phone_number: &str, email: &str, list_id: &str) -> Result<()> {
		let operation = Operation::AddToSmsList;
		let document = SubscriptionJobDocument::sms(phone_number, email, list_id)
			.map_err(|e| self.reject(operation, e))?;
		self.submit_subscription(operation, &document).await
	}

	async fn submit_subscription(
		&self,
		operation: Operation,
		document: &SubscriptionJobDocument,
	) -> Result<()> {
		let payload = serde_json::to_value(document)?;
		let url = self.endpoint(operation.endpoint())?;

		let response = self.send(Method::POST, url, Some(&payload)).await?;
		self.expect_status(operation, &payload, response, StatusCode::ACCEPTED)?;
		Ok(())
	}

	/// Fetches a profile by its Klaviyo id.
	#[instrument(skip(self))]
	pub async fn get_profile(&self, id: &str) -> Result<ProfileRecord> {
		let operation = Operation::GetProfile;
		let id = require_path_segment("profile id", id).map_err(|e| self.reject(operation, e))?;
		let url = self.profile_url(id)?;

		let response = self.send(Method::GET, url, None).await?;
		let response = self.expect_status(operation, &Value::Null, response, StatusCode::OK)?;
		let record: Document<ProfileRecord> = self.decode(operation, None, &response)?;
		Ok(record.data)
	}

	/// Updates attributes of an existing profile.
	#[instrument(skip(self, attributes))]
	pub async fn update_profile(&self, id: &str, attributes: Properties) -> Result<ProfileRecord> {
		let operation = Operation::UpdateProfile;
		let document =
			ProfileUpdateDocument::update(id, attributes).map_err(|e| self.reject(operation, e))?;
		let payload = serde_json::to_value(&document)?;
		let url = self.profile_url(id)?;

		let response = self.send(Method::PATCH, url, Some(&payload)).await?;
		let response = self.expect_status(operation, &payload, response, StatusCode::OK)?;
		let record: Document<ProfileRecord> = self.decode(operation, Some(&payload), &response)?;
		Ok(record.data)
	}

	fn endpoint(&self, path: &str) -> Result<Url> {
		self
			.base_url
			.join(path)
			.map_err(|e| KlaviyoError::InvalidBaseUrl(e.to_string()))
	}

	/// `api/profiles/{id}` with `id` percent-encoded as one path segment.
	fn profile_url(&self, id: &str) -> Result<Url> {
		let id = require_path_segment("profile id", id)?;
		let mut url = self.endpoint("api/profiles/")?;
		url
			.path_segments_mut()
			.map_err(|_| KlaviyoError::InvalidBaseUrl(self.base_url.to_string()))?
			.pop_if_empty()
			.push(id);
		Ok(url)
	}

	async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<RawResponse> {
		debug!(method = %method, url = %url, "Sending Klaviyo request");

		let mut request = self
			.http_client
			.request(method, url)
			.header(AUTHORIZATION, format!("{AUTH_SCHEME} {}", self.api_key.expose()))
			.header(REVISION_HEADER, &self.revision)
			.header(ACCEPT, JSON_CONTENT_TYPE);
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(|e| {
			error!(error = %e, "Network error during Klaviyo request");
			KlaviyoError::Request(e)
		})?;

		let status = response.status();
		let body = response.text().await.map_err(|e| {
			error!(error = %e, "Failed to read Klaviyo response body");
			KlaviyoError::Request(e)
		})?;
		debug!(status = %status, "Received Klaviyo response");

		Ok(RawResponse { status, body })
	}

	/// Passes responses with `expected` status through; anything else is
	/// reported and returned as [`KlaviyoError::Api`].
	fn expect_status(
		&self,
		operation: Operation,
		payload: &Value,
		response: RawResponse,
		expected: StatusCode,
	) -> Result<RawResponse> {
		if response.status == expected {
			return Ok(response);
		}
		let payload = (!payload.is_null()).then_some(payload);
		Err(KlaviyoError::Api(self.api_failure(operation, payload, response)))
	}

	fn api_failure(&self, operation: Operation, payload: Option<&Value>, response: RawResponse) -> ApiFailure {
		let failure = ApiFailure::from_response(response.status.as_u16(), response.body);
		self.reporter.report(&Failure {
			operation,
			payload,
			status: Some(failure.status),
			message: &failure.body,
		});
		failure
	}

	/// Reports a local validation failure. No request is sent.
	fn reject(&self, operation: Operation, err: CoreError) -> KlaviyoError {
		let message = err.to_string();
		self.reporter.report(&Failure {
			operation,
			payload: None,
			status: None,
			message: &message,
		});
		err.into()
	}

	/// Decodes a success body. Undecodable bodies are reported like any
	/// other failure.
	fn decode<T: DeserializeOwned>(
		&self,
		operation: Operation,
		payload: Option<&Value>,
		response: &RawResponse,
	) -> Result<T> {
		serde_json::from_str(&response.body).map_err(|e| {
			error!(error = %e, status = %response.status, "Failed to parse Klaviyo response");
			let message = format!("JSON parse error: {e}");
			self.reporter.report(&Failure {
				operation,
				payload,
				status: Some(response.status.as_u16()),
				message: &message,
			});
			KlaviyoError::InvalidResponse(message)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_requires_api_key() {
		let result = KlaviyoClientBuilder::new().build();
		assert!(matches!(result, Err(KlaviyoError::InvalidApiKey)));
	}

	#[test]
	fn builder_rejects_blank_api_key() {
		let result = KlaviyoClient::builder().api_key("   ").build();
		assert!(matches!(result, Err(KlaviyoError::InvalidApiKey)));
	}

	#[test]
	fn builder_defaults() {
		let client = KlaviyoClient::builder().api_key("pk_test").build().unwrap();
		assert_eq!(client.base_url(), "https://a.klaviyo.com/");
		assert_eq!(client.revision(), "2024-02-15");
	}

	#[test]
	fn builder_normalizes_base_url() {
		let client = KlaviyoClient::builder()
			.api_key("pk_test")
			.base_url("http://localhost:8080/proxy")
			.build()
			.unwrap();
		assert_eq!(client.base_url(), "http://localhost:8080/proxy/");
		assert_eq!(
			client.endpoint("api/events").unwrap().as_str(),
			"http://localhost:8080/proxy/api/events"
		);
	}

	#[test]
	fn builder_rejects_bad_base_urls() {
		for url in ["not a url", "ftp://a.klaviyo.com", ""] {
			let result = KlaviyoClient::builder().api_key("pk").base_url(url).build();
			assert!(
				matches!(result, Err(KlaviyoError::InvalidBaseUrl(_))),
				"{url} should be rejected"
			);
		}
	}

	#[test]
	fn profile_url_encodes_id() {
		let client = KlaviyoClient::builder().api_key("pk").build().unwrap();
		assert_eq!(
			client.profile_url("01H/..?x").unwrap().as_str(),
			"https://a.klaviyo.com/api/profiles/01H%2F..%3Fx"
		);
		assert_eq!(
			client.profile_url("01HABC").unwrap().as_str(),
			"https://a.klaviyo.com/api/profiles/01HABC"
		);
		assert_eq!(
			client.profile_url("...").unwrap().as_str(),
			"https://a.klaviyo.com/api/profiles/..."
		);
	}

	#[test]
	fn profile_url_rejects_dot_segments() {
		let client = KlaviyoClient::builder().api_key("pk").build().unwrap();
		for id in [".", "..", " "] {
			assert!(
				matches!(client.profile_url(id), Err(KlaviyoError::Validation(_))),
				"{id:?} should be rejected"
			);
		}
	}

	#[test]
	fn debug_redacts_api_key() {
		let client = KlaviyoClient::builder().api_key("pk_live_secret").build().unwrap();
		let debug = format!("{client:?}");
		assert!(!debug.contains("pk_live_secret"));
		assert!(debug.contains("[REDACTED]"));
	}

	#[test]
	fn builder_from_settings_uses_base_url() {
		let settings = EnvSettings::from_lookup(|var| match var {
			"KLAVIYO_API_KEY" => Some("pk_env".to_string()),
			"KLAVIYO_BASE_URL" => Some("http://127.0.0.1:1".to_string()),
			_ => None,
		})
		.unwrap();
		let client = KlaviyoClientBuilder::from_settings(settings).build().unwrap();
		assert_eq!(client.base_url(), "http://127.0.0.1:1/");
	}
}

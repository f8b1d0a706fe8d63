// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Async Rust client for the Klaviyo REST API.
//!
//! Covers event tracking, profile import/read/update, and list
//! subscriptions. Each operation sends one request and returns a typed
//! result; there is no batching or background work.
//!
//! # Quick Start
//!
//! ```ignore
//! use klaviyo::{KlaviyoClient, ProfileAttributes, Properties, TrackOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KlaviyoClient::from_env()?;
//!
//!     client.track("Placed Order", TrackOptions::new()
//!         .email("ada@example.com")
//!         .properties(Properties::new().insert("value", 29.99))
//!     ).await?;
//!
//!     let outcome = client.identify(
//!         ProfileAttributes::new("ada@example.com").phone_number("+15551234567"),
//!         Properties::new().insert("plan", "pro"),
//!     ).await?;
//!     println!("profile {}", outcome.profile_id);
//!
//!     client.add_to_list("ada@example.com", "Y6nRLr").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Local argument failures ([`KlaviyoError::MissingIdentifier`],
//! [`KlaviyoError::MissingEmail`], [`KlaviyoError::Validation`]) are returned
//! without sending a request. Unexpected statuses become
//! [`KlaviyoError::Api`], whose [`ApiFailure::kind`] classifies the
//! structured error body:
//!
//! ```ignore
//! use klaviyo::{ApiErrorKind, KlaviyoError};
//!
//! match client.get_profile("01HXYZ").await {
//!     Ok(profile) => println!("{:?}", profile.email()),
//!     Err(KlaviyoError::Api(f)) if f.kind() == ApiErrorKind::NotFound => {}
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
//! # Failure reporting
//!
//! Every failure is also handed to a [`FailureReporter`] before it is
//! returned. The default [`TracingReporter`] logs one `tracing` error event
//! per failure.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod reporter;
pub mod secret;

pub use client::{IdentifyOutcome, KlaviyoClient, KlaviyoClientBuilder, MAX_PHONE_RETRIES};
pub use config::{ClientConfig, ConfigError, EnvSettings};
pub use error::{ApiFailure, KlaviyoError, Result};
pub use reporter::{Failure, FailureReporter, Operation, TracingReporter};
pub use secret::ApiKey;

pub use klaviyo_core::{
	ApiError, ApiErrorDocument, ApiErrorKind, List, Location, PhoneRetry, ProfileAttributes,
	ProfileRecord, Properties, TrackOptions,
};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Klaviyo REST API.
//!
//! This crate contains the JSON:API documents sent to and received from
//! Klaviyo, plus the structured error document the API returns on failure.
//! It performs no I/O; the `klaviyo` crate owns the HTTP client.

pub mod api_error;
pub mod document;
pub mod error;
pub mod event;
pub mod list;
pub mod profile;
pub mod properties;
pub mod subscription;
pub mod validate;

pub use api_error::{ApiError, ApiErrorDocument, ApiErrorKind, ErrorSource, PhoneRetry};
pub use document::{Document, Resource, ResourceRef};
pub use error::CoreError;
pub use event::{
	format_event_time, EventAttributes, EventDocument, TrackOptions, EVENT_TIME_FORMAT,
	TRACK_ONCE_PROPERTY, VALUE_CURRENCY,
};
pub use list::{List, ListCollection};
pub use profile::{
	Location, ProfileAttributes, ProfileImport, ProfileImportDocument, ProfileRecord,
	ProfileUpdateDocument,
};
pub use properties::Properties;
pub use subscription::{ConsentStatus, SubscriptionJobDocument};
pub use validate::{is_blank, require_non_blank, require_path_segment};

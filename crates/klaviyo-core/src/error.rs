// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised while building a request payload.
///
/// These are always local: a payload that fails validation is never sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
	#[error("You must identify a user by email or ID")]
	MissingIdentifier,

	#[error("You must identify a user by email")]
	MissingEmail,

	#[error("{0} must not be empty")]
	EmptyField(&'static str),

	/// `.` and `..` cannot be sent as a single URL path segment.
	#[error("{0} must not be `.` or `..`")]
	DotSegment(&'static str),
}

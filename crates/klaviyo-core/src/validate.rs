// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local argument checks applied before any request is sent.

use crate::error::CoreError;

/// Returns true when the value is absent, empty, or only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
	value.map_or(true, |v| v.trim().is_empty())
}

/// Returns the value unchanged if it is not blank.
pub fn require_non_blank<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CoreError> {
	if is_blank(Some(value)) {
		return Err(CoreError::EmptyField(field));
	}
	Ok(value)
}

/// Like [`require_non_blank`], and also rejects the relative segments `.`
/// and `..`, which URL path normalization would otherwise swallow.
pub fn require_path_segment<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CoreError> {
	let value = require_non_blank(field, value)?;
	if matches!(value, "." | "..") {
		return Err(CoreError::DotSegment(field));
	}
	Ok(value)
}

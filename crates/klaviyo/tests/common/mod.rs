// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::{Arc, Mutex};

use klaviyo::{Failure, FailureReporter, KlaviyoClient, Operation};
use serde_json::Value;
use wiremock::MockServer;

pub const API_KEY: &str = "pk_test_123";

#[derive(Debug, Clone)]
pub struct RecordedFailure {
	pub operation: Operation,
	pub status: Option<u16>,
	pub payload: Option<Value>,
	pub message: String,
}

/// Collects every reported failure for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
	failures: Arc<Mutex<Vec<RecordedFailure>>>,
}

impl RecordingReporter {
	pub fn failures(&self) -> Vec<RecordedFailure> {
		self.failures.lock().unwrap().clone()
	}
}

impl FailureReporter for RecordingReporter {
	fn report(&self, failure: &Failure<'_>) {
		self.failures.lock().unwrap().push(RecordedFailure {
			operation: failure.operation,
			status: failure.status,
			payload: failure.payload.cloned(),
			message: failure.message.to_string(),
		});
	}
}

pub fn client_for(server: &MockServer, reporter: &RecordingReporter) -> KlaviyoClient {
	KlaviyoClient::builder()
		.api_key(API_KEY)
		.base_url(server.uri())
		.reporter(reporter.clone())
		.build()
		.unwrap()
}

pub async fn request_bodies(server: &MockServer) -> Vec<Value> {
	server
		.received_requests()
		.await
		.unwrap()
		.iter()
		.map(|r| r.body_json::<Value>().unwrap())
		.collect()
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `klaviyo` command-line client.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use klaviyo::config::{API_KEY_FILE_VAR, API_KEY_VAR};
use klaviyo::{ConfigError, EnvSettings, KlaviyoClient, KlaviyoClientBuilder};
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.log_json);

	let client = build_client(&cli)?;
	debug!(base_url = client.base_url(), revision = client.revision(), "Klaviyo client ready");
	run(&client, cli.command).await
}

/// Logs go to stderr so stdout stays parseable JSON.
fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let registry = tracing_subscriber::registry().with(filter);

	if json {
		registry
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry.with(fmt::layer().with_writer(std::io::stderr)).init();
	}
}

fn build_client(cli: &Cli) -> Result<KlaviyoClient> {
	let settings =
		resolve_settings(cli, |var| std::env::var(var).ok()).context("loading Klaviyo settings")?;
	let mut builder = KlaviyoClientBuilder::from_settings(settings);

	if let Some(url) = &cli.base_url {
		builder = builder.base_url(url.as_str());
	}
	if let Some(revision) = &cli.revision {
		builder = builder.revision(revision.as_str());
	}
	if let Some(secs) = cli.timeout_secs {
		builder = builder.request_timeout(Duration::from_secs(secs));
	}

	builder.build().context("building Klaviyo client")
}

/// Reads `KLAVIYO_*` settings through `lookup`. An explicit `--api-key`
/// replaces both `KLAVIYO_API_KEY` and `KLAVIYO_API_KEY_FILE`.
fn resolve_settings<F>(cli: &Cli, lookup: F) -> Result<EnvSettings, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	match &cli.api_key {
		Some(key) => EnvSettings::from_lookup(|var| match var {
			API_KEY_VAR => Some(key.clone()),
			API_KEY_FILE_VAR => None,
			_ => lookup(var),
		}),
		None => EnvSettings::from_lookup(lookup),
	}
}

async fn run(client: &KlaviyoClient, command: Command) -> Result<()> {
	match command {
		Command::Track(args) => {
			let (event, options) = args.into_options();
			client.track(&event, options).await?;
			print_json(&json!({ "accepted": true }))
		}
		Command::TrackOnce(args) => {
			let (event, options) = args.into_options();
			client.track_once(&event, options).await?;
			print_json(&json!({ "accepted": true }))
		}
		Command::Identify(args) => {
			let (attributes, properties) = args.into_profile();
			let outcome = client.identify(attributes, properties).await?;
			print_json(&outcome)
		}
		Command::Lists => print_json(&client.lists().await?),
		Command::AddToList { email, list_id } => {
			client.add_to_list(&email, &list_id).await?;
			print_json(&json!({ "accepted": true, "list_id": list_id }))
		}
		Command::AddToSmsList {
			phone_number,
			email,
			list_id,
		} => {
			client.add_to_sms_list(&phone_number, &email, &list_id).await?;
			print_json(&json!({ "accepted": true, "list_id": list_id }))
		}
		Command::GetProfile { id } => print_json(&client.get_profile(&id).await?),
		Command::UpdateProfile { id, attributes } => {
			print_json(&client.update_profile(&id, attributes).await?)
		}
	}
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Settings defaults and validation.
//!
//! Thin by design: the engine performs its own deep validation. This module
//! fills in host-specific defaults (startup timings, version string) and
//! rejects configurations the adapter cannot work with at all.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Default request timeout while the SDK is starting up.
const DEFAULT_REQUEST_TIMEOUT_BEFORE_READY: Duration = Duration::from_secs(5);

/// Default quick retries while starting up.
const DEFAULT_RETRIES_ON_FAILURE_BEFORE_READY: u32 = 1;

/// Default maximum time before the SDK reports a ready timeout.
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait before the first push of buffered events.
const DEFAULT_EVENTS_FIRST_PUSH_WINDOW: Duration = Duration::from_secs(10);

/// User-facing configuration, as deserialized from the embedder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
	/// The SDK key authenticating this client. Required.
	pub sdk_key: String,
	/// Override for the engine's evaluation API base URL.
	pub base_url: Option<String>,
	/// Override for the events/impressions endpoint.
	pub events_url: Option<String>,
	/// Override for the streaming endpoint.
	pub streaming_url: Option<String>,
	/// Whether the streaming sync path is used at all. Defaults to true.
	pub streaming_enabled: Option<bool>,
	/// Startup timing overrides, in seconds.
	pub startup: StartupConfig,
}

/// Startup timing overrides, all optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
	pub request_timeout_before_ready: Option<u64>,
	pub retries_on_failure_before_ready: Option<u32>,
	pub ready_timeout: Option<u64>,
	pub events_first_push_window: Option<u64>,
}

/// Validated startup timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupSettings {
	pub request_timeout_before_ready: Duration,
	pub retries_on_failure_before_ready: u32,
	pub ready_timeout: Duration,
	pub events_first_push_window: Duration,
}

impl Default for StartupSettings {
	fn default() -> Self {
		Self {
			request_timeout_before_ready: DEFAULT_REQUEST_TIMEOUT_BEFORE_READY,
			retries_on_failure_before_ready: DEFAULT_RETRIES_ON_FAILURE_BEFORE_READY,
			ready_timeout: DEFAULT_READY_TIMEOUT,
			events_first_push_window: DEFAULT_EVENTS_FIRST_PUSH_WINDOW,
		}
	}
}

/// Service URL overrides forwarded to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUrls {
	pub sdk: Option<String>,
	pub events: Option<String>,
	pub streaming: Option<String>,
}

/// Validated settings handed to the engine factory.
#[derive(Debug, Clone)]
pub struct Settings {
	pub sdk_key: String,
	pub urls: ServiceUrls,
	pub startup: StartupSettings,
	pub streaming_enabled: bool,
	/// Buffered events and impressions are flushed when the app backgrounds.
	/// Forced on until a persistent storage exists: data still in memory is
	/// lost if the OS kills the backgrounded process.
	pub flush_data_on_background: bool,
	/// Instance version reported to the engine.
	pub version: String,
}

/// Errors for configurations the adapter cannot accept.
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("sdk_key must not be empty")]
	MissingSdkKey,

	#[error("invalid {field} URL: {value}")]
	InvalidUrl { field: &'static str, value: String },
}

/// Validates a config, applying defaults.
pub fn validate(config: SdkConfig) -> Result<Settings, SettingsError> {
	let sdk_key = config.sdk_key.trim().to_string();
	if sdk_key.is_empty() {
		return Err(SettingsError::MissingSdkKey);
	}

	let urls = ServiceUrls {
		sdk: checked_url("base_url", config.base_url)?,
		events: checked_url("events_url", config.events_url)?,
		streaming: checked_url("streaming_url", config.streaming_url)?,
	};

	let defaults = StartupSettings::default();
	let startup = StartupSettings {
		request_timeout_before_ready: config
			.startup
			.request_timeout_before_ready
			.map(Duration::from_secs)
			.unwrap_or(defaults.request_timeout_before_ready),
		retries_on_failure_before_ready: config
			.startup
			.retries_on_failure_before_ready
			.unwrap_or(defaults.retries_on_failure_before_ready),
		ready_timeout: config
			.startup
			.ready_timeout
			.map(Duration::from_secs)
			.unwrap_or(defaults.ready_timeout),
		events_first_push_window: config
			.startup
			.events_first_push_window
			.map(Duration::from_secs)
			.unwrap_or(defaults.events_first_push_window),
	};

	let settings = Settings {
		sdk_key,
		urls,
		startup,
		streaming_enabled: config.streaming_enabled.unwrap_or(true),
		flush_data_on_background: true,
		version: version_string(),
	};
	debug!(
		version = %settings.version,
		streaming_enabled = settings.streaming_enabled,
		"settings validated"
	);
	Ok(settings)
}

/// Instance version reported to the engine, e.g. `rust-0.1.0`.
pub fn version_string() -> String {
	format!("rust-{}", env!("CARGO_PKG_VERSION"))
}

fn checked_url(
	field: &'static str,
	value: Option<String>,
) -> Result<Option<String>, SettingsError> {
	match value {
		None => Ok(None),
		Some(url) => {
			if url.starts_with("https://") || url.starts_with("http://") {
				Ok(Some(url))
			} else {
				Err(SettingsError::InvalidUrl { field, value: url })
			}
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP client with a consistent User-Agent header.
//!
//! Used for the polyfill streaming tier and handed to the engine as the
//! platform's fetch implementation unless the host supplies its own.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// Creates a new HTTP client with the adapter User-Agent header.
pub fn new_client() -> Client {
	builder().build().expect("failed to build HTTP client")
}

/// Creates a new HTTP client builder with the adapter User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client with a custom timeout and the adapter User-Agent.
pub fn new_client_with_timeout(timeout: Duration) -> Client {
	builder()
		.timeout(timeout)
		.build()
		.expect("failed to build HTTP client")
}

/// Returns the adapter User-Agent string.
///
/// Format: `flagship/{version}`
pub fn user_agent() -> String {
	format!("flagship/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_user_agent_has_correct_format() {
		let ua = user_agent();
		assert!(ua.starts_with("flagship/"));
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 2);
		assert!(!parts[1].is_empty());
	}

	#[test]
	fn test_builder_with_timeout() {
		let client = builder().timeout(Duration::from_secs(30)).build();
		assert!(client.is_ok());
	}
}

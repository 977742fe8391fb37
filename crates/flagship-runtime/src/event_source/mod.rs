// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Streaming transport selection.
//!
//! Exactly one streaming implementation is picked at startup, in strict
//! priority order: the native bridge, then a host-global EventSource
//! implementation, then the HTTP polyfill. The polyfill exists purely for
//! resilience — some platform/debug-tooling combinations are known to break
//! native persistent connections — and is only reached when both better
//! options are unavailable.
//!
//! The selection is cached for the provider's lifetime; it is never
//! re-evaluated per connection.

mod native;
mod polyfill;

pub use native::{NativeConnection, NativeEventSourceFactory};
pub use polyfill::{PolyfillConnection, PolyfillEventSourceFactory};

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use flagship_core::EventSourceFactory;

use crate::host::HostRuntime;

/// Which streaming implementation was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportTier {
	/// Native bridge module.
	Native,
	/// Host-global EventSource implementation.
	Global,
	/// HTTP-based polyfill.
	Polyfill,
}

impl TransportTier {
	pub fn as_str(&self) -> &'static str {
		match self {
			TransportTier::Native => "native",
			TransportTier::Global => "global",
			TransportTier::Polyfill => "polyfill",
		}
	}
}

impl fmt::Display for TransportTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Holds the streaming implementation selected for this process.
pub struct EventSourceProvider {
	tier: TransportTier,
	factory: Arc<dyn EventSourceFactory>,
}

impl EventSourceProvider {
	/// Probes the runtime once and picks the best available tier.
	///
	/// A failing native-bridge probe (some runtimes raise on any
	/// native-module access before the bridge is initialized) counts as
	/// "native module absent" and evaluation continues down the tiers.
	pub fn select(runtime: &dyn HostRuntime, http: reqwest::Client) -> Self {
		match runtime.native_stream_bridge() {
			Ok(Some(bridge)) => {
				debug!("using native streaming bridge");
				return Self {
					tier: TransportTier::Native,
					factory: Arc::new(NativeEventSourceFactory::new(bridge)),
				};
			}
			Ok(None) => {}
			Err(error) => {
				debug!(%error, "native bridge probe failed; treating as absent");
			}
		}

		if let Some(global) = runtime.global_event_source() {
			debug!("using host-global EventSource implementation");
			return Self {
				tier: TransportTier::Global,
				factory: global,
			};
		}

		debug!("using HTTP polyfill EventSource implementation");
		Self {
			tier: TransportTier::Polyfill,
			factory: Arc::new(PolyfillEventSourceFactory::new(http)),
		}
	}

	pub fn tier(&self) -> TransportTier {
		self.tier
	}

	pub fn factory(&self) -> Arc<dyn EventSourceFactory> {
		Arc::clone(&self.factory)
	}
}

impl fmt::Debug for EventSourceProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventSourceProvider")
			.field("tier", &self.tier)
			.finish()
	}
}

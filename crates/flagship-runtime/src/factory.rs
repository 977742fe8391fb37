// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Composition layer: assembles the engine factory parameters.
//!
//! Pure wiring. Settings are validated, the platform capabilities object is
//! built from the host runtime (HTTP client, event emitter, streaming
//! transport), a signal-listener factory is prepared, and the lot is handed
//! to the engine's factory. The engine instantiates the signal listener
//! itself with the sync-manager handle it owns.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use flagship_core::{
	EngineModuleFactory, EventSourceFactory, ImpressionListener, SignalListener,
	SyncManagerHandle,
};

use crate::emitter::EventEmitter;
use crate::event_source::{EventSourceProvider, TransportTier};
use crate::host::HostRuntime;
use crate::settings::{self, SdkConfig, Settings, SettingsError};
use crate::signal_listener::LifecycleSignalListener;

/// Constructs the signal listener once the engine has a sync-manager handle.
pub type SignalListenerFactory =
	Box<dyn Fn(Arc<dyn SyncManagerHandle>) -> Box<dyn SignalListener> + Send + Sync>;

/// Platform capabilities contributed to the engine.
pub struct Platform {
	/// HTTP client for the engine's fetch needs.
	pub http: reqwest::Client,
	/// Streaming connection factory; `None` when streaming is disabled.
	pub event_source: Option<Arc<dyn EventSourceFactory>>,
	/// Which transport tier backs `event_source`, when streaming is enabled.
	pub transport_tier: Option<TransportTier>,
}

impl Platform {
	/// A fresh event emitter for the engine's internal pub/sub.
	pub fn emitter() -> EventEmitter<serde_json::Value> {
		EventEmitter::new()
	}
}

impl std::fmt::Debug for Platform {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Platform")
			.field("event_source", &self.event_source.is_some())
			.field("transport_tier", &self.transport_tier)
			.finish()
	}
}

/// Parameter object consumed by the engine factory.
///
/// The opaque module slots are engine internals forwarded untouched; `None`
/// lets the engine fall back to its own defaults.
pub struct SdkFactoryParams {
	pub settings: Settings,
	pub platform: Platform,
	pub signal_listener: Option<SignalListenerFactory>,
	pub impression_listener: Option<Arc<dyn ImpressionListener>>,
	pub storage: Option<Arc<dyn EngineModuleFactory>>,
	pub api_client: Option<Arc<dyn EngineModuleFactory>>,
	pub sync_manager: Option<Arc<dyn EngineModuleFactory>>,
	pub sdk_manager: Option<Arc<dyn EngineModuleFactory>>,
	pub sdk_client_method: Option<Arc<dyn EngineModuleFactory>>,
	pub impressions_observer: Option<Arc<dyn EngineModuleFactory>>,
}

/// The engine's factory failed.
#[derive(Debug, Error)]
#[error("engine factory failed: {0}")]
pub struct EngineError(pub String);

/// The external SDK engine's factory function.
pub trait FlagsEngine {
	/// The public SDK facade (client/manager API) the engine returns.
	type Client;

	fn build(&self, params: SdkFactoryParams) -> Result<Self::Client, EngineError>;
}

/// Errors surfaced when building the SDK.
#[derive(Debug, Error)]
pub enum FactoryError {
	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error(transparent)]
	Engine(#[from] EngineError),
}

/// Builds the SDK: validates settings, wires the platform and hands off to
/// the engine.
pub fn build_sdk<E: FlagsEngine>(
	config: SdkConfig,
	runtime: Arc<dyn HostRuntime>,
	engine: &E,
) -> Result<E::Client, FactoryError> {
	build_sdk_with(config, runtime, engine, |_| {})
}

/// Like [`build_sdk`], with a hook to redefine internal modules before the
/// engine runs. The hook is not part of the public configuration surface;
/// use with caution.
pub fn build_sdk_with<E: FlagsEngine>(
	config: SdkConfig,
	runtime: Arc<dyn HostRuntime>,
	engine: &E,
	update_params: impl FnOnce(&mut SdkFactoryParams),
) -> Result<E::Client, FactoryError> {
	let settings = settings::validate(config)?;

	let http = runtime.fetch().unwrap_or_else(crate::http::new_client);

	let (event_source, transport_tier) = if settings.streaming_enabled {
		let provider = EventSourceProvider::select(runtime.as_ref(), http.clone());
		debug!(tier = %provider.tier(), "streaming transport selected");
		(Some(provider.factory()), Some(provider.tier()))
	} else {
		(None, None)
	};

	let platform = Platform {
		http,
		event_source,
		transport_tier,
	};

	let app_state = runtime.app_state();
	let listener_settings = Arc::new(settings.clone());
	let signal_listener: SignalListenerFactory = Box::new(move |sync_manager| {
		Box::new(LifecycleSignalListener::new(
			sync_manager,
			Arc::clone(&listener_settings),
			Arc::clone(&app_state),
		))
	});

	let mut params = SdkFactoryParams {
		settings,
		platform,
		signal_listener: Some(signal_listener),
		impression_listener: None,
		storage: None,
		api_client: None,
		sync_manager: None,
		sdk_manager: None,
		sdk_client_method: None,
		impressions_observer: None,
	};
	update_params(&mut params);

	Ok(engine.build(params)?)
}

#[cfg(test)]
mod tests {
	use parking_lot::Mutex;

	use flagship_core::AppLifecycleState;

	use crate::host::{
		AppStateCallback, AppStateSource, AppStateSubscription, BridgeProbeError, StreamBridge,
	};

	use super::*;

	struct ForegroundAppState;

	impl AppStateSource for ForegroundAppState {
		fn current_state(&self) -> AppLifecycleState {
			AppLifecycleState::Active
		}

		fn subscribe(&self, _callback: AppStateCallback) -> AppStateSubscription {
			AppStateSubscription::new(|| {})
		}
	}

	struct BareRuntime;

	impl HostRuntime for BareRuntime {
		fn app_state(&self) -> Arc<dyn AppStateSource> {
			Arc::new(ForegroundAppState)
		}

		fn native_stream_bridge(
			&self,
		) -> Result<Option<Arc<dyn StreamBridge>>, BridgeProbeError> {
			Ok(None)
		}
	}

	/// Captures the params it was built with.
	struct RecordingEngine {
		seen: Mutex<Option<ParamsSummary>>,
	}

	#[derive(Debug, Clone, PartialEq, Eq)]
	struct ParamsSummary {
		sdk_key: String,
		has_event_source: bool,
		transport_tier: Option<TransportTier>,
		has_signal_listener: bool,
	}

	impl FlagsEngine for RecordingEngine {
		type Client = ();

		fn build(&self, params: SdkFactoryParams) -> Result<Self::Client, EngineError> {
			*self.seen.lock() = Some(ParamsSummary {
				sdk_key: params.settings.sdk_key.clone(),
				has_event_source: params.platform.event_source.is_some(),
				transport_tier: params.platform.transport_tier,
				has_signal_listener: params.signal_listener.is_some(),
			});
			Ok(())
		}
	}

	struct FailingEngine;

	impl FlagsEngine for FailingEngine {
		type Client = ();

		fn build(&self, _params: SdkFactoryParams) -> Result<Self::Client, EngineError> {
			Err(EngineError("storage unavailable".to_string()))
		}
	}

	fn config() -> SdkConfig {
		SdkConfig {
			sdk_key: "sdk-key".to_string(),
			..SdkConfig::default()
		}
	}

	#[test]
	fn test_platform_emitter_channels_are_independent() {
		let a = Platform::emitter();
		let _sub = a.subscribe(|_| {});
		assert_eq!(a.listener_count(), 1);
		assert_eq!(Platform::emitter().listener_count(), 0);
	}

	#[tokio::test]
	async fn test_build_wires_platform_and_signal_listener() {
		let engine = RecordingEngine {
			seen: Mutex::new(None),
		};
		build_sdk(config(), Arc::new(BareRuntime), &engine).unwrap();

		let seen = engine.seen.lock().clone().unwrap();
		assert_eq!(seen.sdk_key, "sdk-key");
		assert!(seen.has_event_source);
		// No native bridge and no global implementation in this runtime.
		assert_eq!(seen.transport_tier, Some(TransportTier::Polyfill));
		assert!(seen.has_signal_listener);
	}

	#[tokio::test]
	async fn test_streaming_disabled_omits_event_source() {
		let engine = RecordingEngine {
			seen: Mutex::new(None),
		};
		let config = SdkConfig {
			streaming_enabled: Some(false),
			..config()
		};
		build_sdk(config, Arc::new(BareRuntime), &engine).unwrap();

		let seen = engine.seen.lock().clone().unwrap();
		assert!(!seen.has_event_source);
		assert_eq!(seen.transport_tier, None);
	}

	#[tokio::test]
	async fn test_invalid_config_fails_before_engine() {
		let engine = FailingEngine;
		let config = SdkConfig {
			sdk_key: String::new(),
			..SdkConfig::default()
		};
		let err = build_sdk(config, Arc::new(BareRuntime), &engine).unwrap_err();
		assert!(matches!(err, FactoryError::Settings(_)));
	}

	#[tokio::test]
	async fn test_engine_error_is_propagated() {
		let err = build_sdk(config(), Arc::new(BareRuntime), &FailingEngine).unwrap_err();
		assert!(matches!(err, FactoryError::Engine(_)));
	}

	#[tokio::test]
	async fn test_update_hook_can_redefine_modules() {
		let engine = RecordingEngine {
			seen: Mutex::new(None),
		};
		build_sdk_with(config(), Arc::new(BareRuntime), &engine, |params| {
			params.signal_listener = None;
		})
		.unwrap();

		let seen = engine.seen.lock().clone().unwrap();
		assert!(!seen.has_signal_listener);
	}
}

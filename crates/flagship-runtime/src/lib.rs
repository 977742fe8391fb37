// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host-runtime adapter for the Flagship SDK engine.
//!
//! The engine (flag evaluation, synchronization, storage) is an external
//! collaborator; this crate binds it to a concrete host runtime by
//! supplying the capabilities the engine needs:
//!
//! - **Streaming transport**: an SSE-style connection with native, global
//!   and HTTP-polyfill tiers, selected once at startup
//! - **Lifecycle signaling**: pauses and resumes synchronization as the app
//!   moves between foreground and background
//! - **Settings**: host-specific defaults and validation
//! - **Composition**: the factory parameter object the engine consumes
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use flagship_runtime::{build_sdk, SdkConfig};
//!
//! let config = SdkConfig {
//!     sdk_key: "sdk-key".to_string(),
//!     ..SdkConfig::default()
//! };
//! // `runtime` implements HostRuntime; `engine` implements FlagsEngine.
//! let client = build_sdk(config, Arc::new(runtime), &engine)?;
//! ```

pub mod emitter;
pub mod event_source;
pub mod factory;
pub mod host;
pub mod http;
pub mod settings;
pub mod signal_listener;

pub use emitter::{EventEmitter, Subscription};
pub use event_source::{EventSourceProvider, TransportTier};
pub use factory::{
	build_sdk, build_sdk_with, EngineError, FactoryError, FlagsEngine, Platform,
	SdkFactoryParams, SignalListenerFactory,
};
pub use host::{
	AppStateCallback, AppStateSource, AppStateSubscription, BridgeEvent, BridgeEventKind,
	BridgeProbeError, HostRuntime, StreamBridge,
};
pub use settings::{SdkConfig, Settings, SettingsError};
pub use signal_listener::LifecycleSignalListener;

// Re-export contract types for convenience
pub use flagship_core::{
	AppLifecycleState, EventHandlers, EventSourceConnection, EventSourceFactory, ReadyState,
	SignalListener, StreamEvent, SyncManagerHandle, Transition, TransportError,
};

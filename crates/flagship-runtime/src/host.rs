// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host-runtime contract consumed by the adapter.
//!
//! The host supplies an app-lifecycle observable, optionally a native
//! streaming bridge with its process-wide event channel, optionally an
//! ambient EventSource implementation, and optionally an HTTP client
//! override. Everything is probed once at startup; the adapter never
//! re-evaluates capabilities per connection.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flagship_core::{AppLifecycleState, EventSourceFactory};

use crate::emitter::EventEmitter;

/// Callback invoked on every app lifecycle change.
pub type AppStateCallback = Arc<dyn Fn(AppLifecycleState) + Send + Sync>;

/// Observable for OS foreground/background notifications.
pub trait AppStateSource: Send + Sync {
	/// The state at the moment of the call.
	fn current_state(&self) -> AppLifecycleState;

	/// Registers a change listener. The listener stays registered until the
	/// returned guard is dropped.
	fn subscribe(&self, callback: AppStateCallback) -> AppStateSubscription;
}

/// Guard for a registered lifecycle listener. Dropping it unsubscribes.
pub struct AppStateSubscription {
	cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl AppStateSubscription {
	pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}
}

impl Drop for AppStateSubscription {
	fn drop(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl fmt::Debug for AppStateSubscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AppStateSubscription")
			.field("active", &self.cancel.is_some())
			.finish()
	}
}

/// Kind tag on events coming out of the native streaming bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeEventKind {
	/// A data frame for a connection.
	Message,
	/// Connection acknowledged by the server.
	Open,
	/// The connection failed.
	Failed,
}

/// Event emitted on the bridge's shared channel, tagged with the id of the
/// connection it belongs to. Multiple connections (including superseded
/// attempts) may be in flight; every connection filters by its own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEvent {
	pub id: u64,
	pub kind: BridgeEventKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl BridgeEvent {
	pub fn message(id: u64, data: impl Into<String>) -> Self {
		Self {
			id,
			kind: BridgeEventKind::Message,
			data: None,
			message: Some(data.into()),
		}
	}

	pub fn open(id: u64) -> Self {
		Self {
			id,
			kind: BridgeEventKind::Open,
			data: None,
			message: None,
		}
	}

	pub fn failed(id: u64, message: impl Into<String>) -> Self {
		Self {
			id,
			kind: BridgeEventKind::Failed,
			data: None,
			message: Some(message.into()),
		}
	}

	/// The payload of a message event. Some bridges deliver it in `message`,
	/// others in `data`.
	pub fn payload(&self) -> Option<&str> {
		self.message.as_deref().or(self.data.as_deref())
	}
}

/// Native streaming bridge: connect/close primitives plus a shared event
/// channel carrying [`BridgeEvent`]s for every connection in the process.
pub trait StreamBridge: Send + Sync {
	fn connect(&self, url: &str, id: u64);

	fn close(&self, id: u64);

	/// The process-wide dispatch channel.
	fn events(&self) -> &EventEmitter<BridgeEvent>;
}

/// Probing for the native bridge failed.
///
/// Some runtimes raise on any native-module access before the bridge is
/// initialized; the transport shim treats this as "native module absent".
#[derive(Debug, Error)]
#[error("native bridge probe failed: {0}")]
pub struct BridgeProbeError(pub String);

/// The capabilities a host runtime contributes to the adapter.
pub trait HostRuntime: Send + Sync {
	/// The app-lifecycle observable.
	fn app_state(&self) -> Arc<dyn AppStateSource>;

	/// Probes for the native streaming bridge. `Err` is downgraded to
	/// absence by the transport shim.
	fn native_stream_bridge(&self) -> Result<Option<Arc<dyn StreamBridge>>, BridgeProbeError>;

	/// An ambient EventSource implementation, when the runtime provides one.
	fn global_event_source(&self) -> Option<Arc<dyn EventSourceFactory>> {
		None
	}

	/// Host-supplied HTTP client override.
	fn fetch(&self) -> Option<reqwest::Client> {
		None
	}
}

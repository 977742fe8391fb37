// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The uniform streaming-connection interface.
//!
//! Every transport tier (native bridge, host-global implementation, HTTP
//! polyfill) exposes the same surface: a factory that opens connections and
//! a connection carrying a ready state plus open/message/error callbacks.
//! The engine's streaming sync code drives it exactly as it would drive a
//! standard SSE client.
//!
//! There is no reconnect at this layer. The engine treats an error callback
//! as "connection lost" and owns the retry decision.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Connection lifecycle state.
///
/// `Connecting` -> `Open` on the first successful acknowledgment; `Closed`
/// on explicit close or unrecoverable error. `Closed` is terminal: a closed
/// connection ignores every further transport event for its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
	Connecting,
	Open,
	Closed,
}

/// Event delivered to connection callbacks and generic listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
	/// Connection acknowledged by the server.
	Open,
	/// A data frame arrived.
	Message { data: String },
	/// The connection failed or was lost.
	Error { message: Option<String> },
}

impl StreamEvent {
	/// Returns the event type name as a string.
	pub fn event_type(&self) -> &'static str {
		match self {
			StreamEvent::Open => "open",
			StreamEvent::Message { .. } => "message",
			StreamEvent::Error { .. } => "error",
		}
	}
}

/// Callback invoked with a borrowed stream event.
pub type StreamCallback = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

/// Optional per-connection callbacks, set by the caller before connecting.
#[derive(Default, Clone)]
pub struct EventHandlers {
	pub on_open: Option<StreamCallback>,
	pub on_message: Option<StreamCallback>,
	pub on_error: Option<StreamCallback>,
}

impl EventHandlers {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_on_open(mut self, f: impl Fn(&StreamEvent) + Send + Sync + 'static) -> Self {
		self.on_open = Some(Arc::new(f));
		self
	}

	pub fn with_on_message(mut self, f: impl Fn(&StreamEvent) + Send + Sync + 'static) -> Self {
		self.on_message = Some(Arc::new(f));
		self
	}

	pub fn with_on_error(mut self, f: impl Fn(&StreamEvent) + Send + Sync + 'static) -> Self {
		self.on_error = Some(Arc::new(f));
		self
	}

	/// Invokes the named callback matching the event's type, if set.
	pub fn invoke(&self, event: &StreamEvent) {
		let named = match event {
			StreamEvent::Open => self.on_open.as_ref(),
			StreamEvent::Message { .. } => self.on_message.as_ref(),
			StreamEvent::Error { .. } => self.on_error.as_ref(),
		};
		if let Some(callback) = named {
			callback(event);
		}
	}
}

impl fmt::Debug for EventHandlers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventHandlers")
			.field("on_open", &self.on_open.is_some())
			.field("on_message", &self.on_message.is_some())
			.field("on_error", &self.on_error.is_some())
			.finish()
	}
}

/// One logical SSE-style connection.
pub trait EventSourceConnection: Send + Sync {
	/// The URL this connection was opened against.
	fn url(&self) -> &str;

	fn ready_state(&self) -> ReadyState;

	/// Closes the connection. No-op when already closed. A connection still
	/// `Connecting` has its in-flight attempt cancelled first.
	fn close(&self);

	/// Registers a generic listener receiving every event after the named
	/// callback for that event type has run.
	fn add_event_listener(&self, listener: StreamCallback);
}

/// Constructs streaming connections. The transport shim selects exactly one
/// implementation per process and the engine never learns which.
pub trait EventSourceFactory: Send + Sync {
	fn connect(
		&self,
		url: &str,
		handlers: EventHandlers,
	) -> Result<Arc<dyn EventSourceConnection>, TransportError>;
}

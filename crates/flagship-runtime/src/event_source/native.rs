// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Streaming connections over the native bridge.
//!
//! The bridge exposes `connect(url, id)` / `close(id)` plus one shared event
//! channel for every connection in the process. Each connection filters the
//! channel by its own id: events for superseded or already-closed ids are
//! discarded without logging, which is expected under normal
//! multi-connection churn.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use flagship_core::{
	EventHandlers, EventSourceConnection, EventSourceFactory, ReadyState, StreamCallback,
	StreamEvent, TransportError,
};

use crate::emitter::Subscription;
use crate::host::{BridgeEvent, BridgeEventKind, StreamBridge};

/// Opens [`NativeConnection`]s over a native bridge.
///
/// Owns the monotonically increasing connection-id counter; ids are unique
/// per factory and never reset.
pub struct NativeEventSourceFactory {
	bridge: Arc<dyn StreamBridge>,
	next_id: AtomicU64,
}

impl NativeEventSourceFactory {
	pub fn new(bridge: Arc<dyn StreamBridge>) -> Self {
		Self {
			bridge,
			next_id: AtomicU64::new(0),
		}
	}
}

impl EventSourceFactory for NativeEventSourceFactory {
	fn connect(
		&self,
		url: &str,
		handlers: EventHandlers,
	) -> Result<Arc<dyn EventSourceConnection>, TransportError> {
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		debug!(url, id, "opening native streaming connection");
		Ok(NativeConnection::connect(
			Arc::clone(&self.bridge),
			id,
			url,
			handlers,
		))
	}
}

/// One SSE-style connection backed by the native bridge.
pub struct NativeConnection {
	id: u64,
	url: String,
	bridge: Arc<dyn StreamBridge>,
	ready_state: Mutex<ReadyState>,
	handlers: EventHandlers,
	listeners: Mutex<Vec<StreamCallback>>,
	subscription: Mutex<Option<Subscription>>,
}

impl NativeConnection {
	fn connect(
		bridge: Arc<dyn StreamBridge>,
		id: u64,
		url: &str,
		handlers: EventHandlers,
	) -> Arc<Self> {
		let connection = Arc::new(Self {
			id,
			url: url.to_string(),
			bridge: Arc::clone(&bridge),
			ready_state: Mutex::new(ReadyState::Connecting),
			handlers,
			listeners: Mutex::new(Vec::new()),
			subscription: Mutex::new(None),
		});

		bridge.connect(url, id);

		let weak: Weak<NativeConnection> = Arc::downgrade(&connection);
		let subscription = bridge.events().subscribe(move |event| {
			if let Some(connection) = weak.upgrade() {
				connection.handle_bridge_event(event);
			}
		});
		*connection.subscription.lock() = Some(subscription);

		connection
	}

	fn handle_bridge_event(&self, event: &BridgeEvent) {
		if event.id != self.id {
			return;
		}
		// A closed connection is terminal. This also suppresses the spurious
		// failure event some bridges emit when the connection is closed
		// explicitly.
		if *self.ready_state.lock() == ReadyState::Closed {
			return;
		}

		match event.kind {
			BridgeEventKind::Message => {
				let stream_event = StreamEvent::Message {
					data: event.payload().unwrap_or_default().to_string(),
				};
				self.dispatch(&stream_event);
			}
			BridgeEventKind::Open => {
				*self.ready_state.lock() = ReadyState::Open;
				self.dispatch(&StreamEvent::Open);
			}
			BridgeEventKind::Failed => {
				debug!(id = self.id, message = ?event.message, "native streaming connection failed");
				let stream_event = StreamEvent::Error {
					message: event.message.clone(),
				};
				self.dispatch(&stream_event);
				self.subscription.lock().take();
				self.close_connection();
			}
		}
	}

	/// Invokes the matching named callback, then every generic listener.
	fn dispatch(&self, event: &StreamEvent) {
		self.handlers.invoke(event);
		let listeners: Vec<StreamCallback> = self.listeners.lock().clone();
		for listener in listeners {
			listener(event);
		}
	}

	/// Aborts an attempt that has not been acknowledged yet.
	fn cancel_connection(&self) {
		self.bridge.close(self.id);
	}

	fn close_connection(&self) {
		*self.ready_state.lock() = ReadyState::Closed;
		self.subscription.lock().take();
		self.bridge.close(self.id);
	}
}

impl EventSourceConnection for NativeConnection {
	fn url(&self) -> &str {
		&self.url
	}

	fn ready_state(&self) -> ReadyState {
		*self.ready_state.lock()
	}

	fn close(&self) {
		let state = *self.ready_state.lock();
		if state == ReadyState::Closed {
			return;
		}
		if state == ReadyState::Connecting {
			self.cancel_connection();
		}
		self.close_connection();
	}

	fn add_event_listener(&self, listener: StreamCallback) {
		self.listeners.lock().push(listener);
	}
}

#[cfg(test)]
mod tests {
	use crate::emitter::EventEmitter;

	use super::*;

	#[derive(Debug, Clone, PartialEq, Eq)]
	enum BridgeCall {
		Connect(String, u64),
		Close(u64),
	}

	/// Records connect/close calls and lets tests emit bridge events.
	struct FakeBridge {
		calls: Mutex<Vec<BridgeCall>>,
		events: EventEmitter<BridgeEvent>,
	}

	impl FakeBridge {
		fn new() -> Arc<Self> {
			Arc::new(Self {
				calls: Mutex::new(Vec::new()),
				events: EventEmitter::new(),
			})
		}

		fn calls(&self) -> Vec<BridgeCall> {
			self.calls.lock().clone()
		}
	}

	impl StreamBridge for FakeBridge {
		fn connect(&self, url: &str, id: u64) {
			self.calls.lock().push(BridgeCall::Connect(url.to_string(), id));
		}

		fn close(&self, id: u64) {
			self.calls.lock().push(BridgeCall::Close(id));
		}

		fn events(&self) -> &EventEmitter<BridgeEvent> {
			&self.events
		}
	}

	/// Collects every event a connection dispatches.
	fn recording_handlers() -> (EventHandlers, Arc<Mutex<Vec<String>>>) {
		let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
		let handlers = EventHandlers::new()
			.with_on_open({
				let log = Arc::clone(&log);
				move |_| log.lock().push("open".to_string())
			})
			.with_on_message({
				let log = Arc::clone(&log);
				move |event| {
					if let StreamEvent::Message { data } = event {
						log.lock().push(format!("message:{data}"));
					}
				}
			})
			.with_on_error({
				let log = Arc::clone(&log);
				move |event| {
					if let StreamEvent::Error { message } = event {
						log.lock()
							.push(format!("error:{}", message.clone().unwrap_or_default()));
					}
				}
			});
		(handlers, log)
	}

	#[test]
	fn test_ids_are_monotonic_per_factory() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);

		let a = factory.connect("https://stream.test/a", EventHandlers::new()).unwrap();
		let b = factory.connect("https://stream.test/b", EventHandlers::new()).unwrap();
		assert_eq!(a.ready_state(), ReadyState::Connecting);
		assert_eq!(b.ready_state(), ReadyState::Connecting);

		assert_eq!(
			bridge.calls(),
			vec![
				BridgeCall::Connect("https://stream.test/a".to_string(), 0),
				BridgeCall::Connect("https://stream.test/b".to_string(), 1),
			]
		);
	}

	#[test]
	fn test_open_and_message_events() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);
		let (handlers, log) = recording_handlers();

		let connection = factory.connect("https://stream.test", handlers).unwrap();
		bridge.events.emit(&BridgeEvent::open(0));
		assert_eq!(connection.ready_state(), ReadyState::Open);

		bridge.events.emit(&BridgeEvent::message(0, "payload"));
		assert_eq!(
			log.lock().clone(),
			vec!["open".to_string(), "message:payload".to_string()]
		);
	}

	#[test]
	fn test_generic_listeners_receive_events_after_named_callbacks() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);
		let (handlers, log) = recording_handlers();

		let connection = factory.connect("https://stream.test", handlers).unwrap();
		connection.add_event_listener({
			let log = Arc::clone(&log);
			Arc::new(move |event| log.lock().push(format!("listener:{}", event.event_type())))
		});

		bridge.events.emit(&BridgeEvent::open(0));
		assert_eq!(
			log.lock().clone(),
			vec!["open".to_string(), "listener:open".to_string()]
		);
	}

	#[test]
	fn test_stray_ids_are_ignored() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);

		let (old_handlers, old_log) = recording_handlers();
		let old = factory.connect("https://stream.test", old_handlers).unwrap();
		old.close();
		assert_eq!(old.ready_state(), ReadyState::Closed);

		let (new_handlers, new_log) = recording_handlers();
		let new = factory.connect("https://stream.test", new_handlers).unwrap();

		// Late events for the superseded id reach neither connection, and do
		// not resurrect the closed one.
		bridge.events.emit(&BridgeEvent::open(0));
		bridge.events.emit(&BridgeEvent::message(0, "stale"));
		bridge.events.emit(&BridgeEvent::failed(0, "stale failure"));
		assert!(old_log.lock().is_empty());
		assert!(new_log.lock().is_empty());
		assert_eq!(old.ready_state(), ReadyState::Closed);
		assert_eq!(new.ready_state(), ReadyState::Connecting);

		bridge.events.emit(&BridgeEvent::open(1));
		assert_eq!(new.ready_state(), ReadyState::Open);
		assert_eq!(new_log.lock().clone(), vec!["open".to_string()]);
	}

	#[test]
	fn test_failure_dispatches_error_and_closes() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);
		let (handlers, log) = recording_handlers();

		let connection = factory.connect("https://stream.test", handlers).unwrap();
		bridge.events.emit(&BridgeEvent::open(0));
		bridge.events.emit(&BridgeEvent::failed(0, "boom"));

		assert_eq!(connection.ready_state(), ReadyState::Closed);
		assert_eq!(
			log.lock().clone(),
			vec!["open".to_string(), "error:boom".to_string()]
		);
		// Failure path tears down the native side too.
		assert!(bridge.calls().contains(&BridgeCall::Close(0)));

		// Nothing further is delivered for this id.
		bridge.events.emit(&BridgeEvent::message(0, "late"));
		assert_eq!(log.lock().len(), 2);
	}

	#[test]
	fn test_close_induced_failure_is_suppressed() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);
		let (handlers, log) = recording_handlers();

		let connection = factory.connect("https://stream.test", handlers).unwrap();
		bridge.events.emit(&BridgeEvent::open(0));
		connection.close();

		// Android emits a failure when a connection is closed explicitly.
		bridge.events.emit(&BridgeEvent::failed(0, "closed by us"));
		assert_eq!(log.lock().clone(), vec!["open".to_string()]);
		assert_eq!(connection.ready_state(), ReadyState::Closed);
	}

	#[test]
	fn test_cancel_before_close_while_connecting() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);

		let connection = factory.connect("https://stream.test", EventHandlers::new()).unwrap();
		assert_eq!(connection.ready_state(), ReadyState::Connecting);
		connection.close();

		// Cancel path first, then the normal close path.
		assert_eq!(
			bridge.calls(),
			vec![
				BridgeCall::Connect("https://stream.test".to_string(), 0),
				BridgeCall::Close(0),
				BridgeCall::Close(0),
			]
		);
		assert_eq!(connection.ready_state(), ReadyState::Closed);
	}

	#[test]
	fn test_close_is_idempotent() {
		let bridge = FakeBridge::new();
		let factory = NativeEventSourceFactory::new(Arc::clone(&bridge) as Arc<dyn StreamBridge>);

		let connection = factory.connect("https://stream.test", EventHandlers::new()).unwrap();
		bridge.events.emit(&BridgeEvent::open(0));
		connection.close();
		let calls_after_first = bridge.calls().len();
		connection.close();
		assert_eq!(bridge.calls().len(), calls_after_first);
	}
}

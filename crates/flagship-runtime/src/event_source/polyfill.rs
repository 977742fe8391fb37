// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP polyfill streaming tier.
//!
//! Reproduces the streaming-connection interface over a plain HTTP request
//! with `Accept: text/event-stream`, parsed by `eventsource-stream`. Used
//! only when neither the native bridge nor a host-global implementation is
//! available.
//!
//! There is no reconnect here: a transport error, a non-success status or a
//! server-closed stream all surface through `on_error` exactly once, after
//! which the connection is terminally closed. The engine owns retry.

use std::sync::Arc;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use flagship_core::{
	EventHandlers, EventSourceConnection, EventSourceFactory, ReadyState, StreamCallback,
	StreamEvent, TransportError,
};

/// Opens [`PolyfillConnection`]s over a shared HTTP client.
pub struct PolyfillEventSourceFactory {
	http: reqwest::Client,
}

impl PolyfillEventSourceFactory {
	pub fn new(http: reqwest::Client) -> Self {
		Self { http }
	}
}

impl EventSourceFactory for PolyfillEventSourceFactory {
	fn connect(
		&self,
		url: &str,
		handlers: EventHandlers,
	) -> Result<Arc<dyn EventSourceConnection>, TransportError> {
		let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
			TransportError::ConnectFailed("no async runtime available for HTTP streaming".to_string())
		})?;

		debug!(url, "opening polyfill streaming connection");
		let connection = Arc::new(PolyfillConnection {
			url: url.to_string(),
			ready_state: Mutex::new(ReadyState::Connecting),
			handlers,
			listeners: Mutex::new(Vec::new()),
			task: Mutex::new(None),
		});

		let task = runtime.spawn(run_stream(Arc::clone(&connection), self.http.clone()));
		*connection.task.lock() = Some(task);

		Ok(connection)
	}
}

/// One SSE-style connection over plain HTTP.
pub struct PolyfillConnection {
	url: String,
	ready_state: Mutex<ReadyState>,
	handlers: EventHandlers,
	listeners: Mutex<Vec<StreamCallback>>,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl PolyfillConnection {
	fn dispatch(&self, event: &StreamEvent) {
		self.handlers.invoke(event);
		let listeners: Vec<StreamCallback> = self.listeners.lock().clone();
		for listener in listeners {
			listener(event);
		}
	}

	/// Marks the connection open unless it was closed while connecting.
	fn mark_open(&self) -> bool {
		{
			let mut state = self.ready_state.lock();
			if *state == ReadyState::Closed {
				return false;
			}
			*state = ReadyState::Open;
		}
		self.dispatch(&StreamEvent::Open);
		true
	}

	fn deliver_message(&self, data: String) {
		if *self.ready_state.lock() == ReadyState::Closed {
			return;
		}
		self.dispatch(&StreamEvent::Message { data });
	}

	/// Terminal failure: error callback once, then closed.
	fn fail(&self, error: TransportError) {
		{
			let mut state = self.ready_state.lock();
			if *state == ReadyState::Closed {
				return;
			}
			*state = ReadyState::Closed;
		}
		warn!(url = %self.url, %error, "polyfill streaming connection lost");
		self.dispatch(&StreamEvent::Error {
			message: Some(error.to_string()),
		});
	}
}

impl EventSourceConnection for PolyfillConnection {
	fn url(&self) -> &str {
		&self.url
	}

	fn ready_state(&self) -> ReadyState {
		*self.ready_state.lock()
	}

	fn close(&self) {
		{
			let mut state = self.ready_state.lock();
			if *state == ReadyState::Closed {
				return;
			}
			*state = ReadyState::Closed;
		}
		if let Some(task) = self.task.lock().take() {
			task.abort();
		}
	}

	fn add_event_listener(&self, listener: StreamCallback) {
		self.listeners.lock().push(listener);
	}
}

/// Drives one request/stream cycle; any exit is terminal for the connection.
async fn run_stream(connection: Arc<PolyfillConnection>, http: reqwest::Client) {
	match stream_events(&connection, &http).await {
		Ok(()) => {
			// The server closed the stream; the engine decides whether to
			// open a new connection.
			connection.fail(TransportError::Stream("stream ended".to_string()));
		}
		Err(error) => connection.fail(error),
	}
}

async fn stream_events(
	connection: &PolyfillConnection,
	http: &reqwest::Client,
) -> Result<(), TransportError> {
	let response = http
		.get(&connection.url)
		.header("Accept", "text/event-stream")
		.header("Cache-Control", "no-cache")
		.send()
		.await
		.map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

	if !response.status().is_success() {
		return Err(TransportError::ConnectFailed(format!(
			"unexpected status {}",
			response.status()
		)));
	}

	if !connection.mark_open() {
		return Ok(());
	}

	let mut events = response.bytes_stream().eventsource();
	while let Some(event) = events.next().await {
		match event {
			Ok(event) => {
				// Comment-only frames carry no data.
				if event.data.is_empty() {
					continue;
				}
				connection.deliver_message(event.data);
			}
			Err(e) => return Err(TransportError::Stream(e.to_string())),
		}
	}

	Ok(())
}

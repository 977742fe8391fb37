// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Handles the SDK engine exposes to the host adapter.
//!
//! The engine owns the synchronization subsystem; the adapter only drives it
//! through these traits. Optional capabilities (a push manager is absent when
//! streaming is disabled, a polling manager when running push-only) are
//! expressed as `Option` accessors with `None` defaults, so a minimal engine
//! implements nothing but the methods it actually supports.

/// Handle for the streaming (real-time update) synchronization path.
///
/// Both operations are idempotent at the engine level: calling `start` on an
/// already-started push manager is a no-op there, as is `stop` on a stopped
/// one.
pub trait PushManagerHandle: Send + Sync {
	fn start(&self);
	fn stop(&self);
}

/// Handle for the interval-based synchronization path.
pub trait PollingManagerHandle: Send + Sync {
	/// Triggers an immediate re-sync of all data.
	fn sync_all(&self);
}

/// Opaque handle to the engine's synchronization manager.
///
/// Created by the engine before the signal listener starts and destroyed
/// when the owning client is destroyed, after the listener's `stop`. The
/// adapter never constructs one.
pub trait SyncManagerHandle: Send + Sync {
	fn start(&self) {}

	fn stop(&self) {}

	/// Flushes buffered events and impressions. Fire-and-forget: the engine
	/// does not guarantee completion if the OS suspends network I/O.
	fn flush(&self) {}

	/// The streaming sub-handle, when the engine runs in push mode.
	fn push_manager(&self) -> Option<&dyn PushManagerHandle> {
		None
	}

	/// The polling sub-handle, when the engine tracks one separately.
	fn polling_manager(&self) -> Option<&dyn PollingManagerHandle> {
		None
	}
}

/// Bridges host signals (app lifecycle, process shutdown) to the engine.
///
/// The engine calls `start` once at client creation and `stop` once at
/// client destruction. A stopped listener is not restarted.
pub trait SignalListener: Send + Sync {
	fn start(&self);
	fn stop(&self);
}

/// Receives every impression the engine generates, when the embedder opts in.
pub trait ImpressionListener: Send + Sync {
	fn log_impression(&self, impression: &serde_json::Value);
}

/// Marker for opaque engine module factories passed through the adapter.
///
/// Storage, API client, sync manager, SDK manager, client-method and
/// impressions-observer factories are engine internals; the adapter only
/// forwards them, so they are identified by name and nothing else.
pub trait EngineModuleFactory: Send + Sync {
	fn name(&self) -> &str;
}

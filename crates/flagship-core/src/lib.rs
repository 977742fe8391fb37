// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Contract types shared between the Flagship host adapter and the SDK engine.
//!
//! The engine (flag evaluation, synchronization, storage, telemetry) is an
//! external collaborator. This crate defines the seam it is reached through:
//!
//! - App lifecycle states and the foreground/background transition tracker
//! - Handles the engine exposes to the adapter (sync, push, polling)
//! - The streaming-connection interface implemented by the transport tiers
//! - Transport error types

pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod streaming;

pub use engine::{
	EngineModuleFactory, ImpressionListener, PollingManagerHandle, PushManagerHandle,
	SignalListener, SyncManagerHandle,
};
pub use error::TransportError;
pub use lifecycle::{AppLifecycleState, Transition, TransitionTracker};
pub use streaming::{
	EventHandlers, EventSourceConnection, EventSourceFactory, ReadyState, StreamCallback,
	StreamEvent,
};

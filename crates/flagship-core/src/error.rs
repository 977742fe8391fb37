// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transport error types.

use thiserror::Error;

/// Errors surfaced by the streaming transport tiers.
#[derive(Debug, Error)]
pub enum TransportError {
	/// Establishing the connection failed.
	#[error("connect failed: {0}")]
	ConnectFailed(String),

	/// The connection dropped or the stream produced an error mid-flight.
	#[error("stream error: {0}")]
	Stream(String),
}

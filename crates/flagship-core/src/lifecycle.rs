// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! App lifecycle states and foreground/background transition tracking.
//!
//! The host OS reports lifecycle states as the app moves between foreground
//! and background. Only the background/not-background split matters to the
//! adapter: `inactive` (iOS transient state), `unknown` and `extension` are
//! all treated as foreground-like, since fetch, timers and streaming keep
//! working in them.
//!
//! [`TransitionTracker`] coalesces noisy state sequences into at most one
//! transition per contiguous band, so `[active, inactive, inactive, active]`
//! never re-fires the foreground action.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// App lifecycle state as reported by the host OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycleState {
	/// App is in the foreground and receiving events.
	Active,
	/// Transient foreground state (e.g., incoming call or control center).
	Inactive,
	/// App is in the background.
	Background,
	/// App extension context.
	Extension,
	/// State could not be determined.
	Unknown,
}

impl AppLifecycleState {
	/// Returns true for the only state that pauses synchronization.
	pub fn is_background(&self) -> bool {
		matches!(self, AppLifecycleState::Background)
	}

	/// Returns the lowercase state name used by the host runtime.
	pub fn as_str(&self) -> &'static str {
		match self {
			AppLifecycleState::Active => "active",
			AppLifecycleState::Inactive => "inactive",
			AppLifecycleState::Background => "background",
			AppLifecycleState::Extension => "extension",
			AppLifecycleState::Unknown => "unknown",
		}
	}
}

impl fmt::Display for AppLifecycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for AppLifecycleState {
	type Err = std::convert::Infallible;

	/// Host state strings outside the known set map to [`Unknown`], which is
	/// foreground-like. The authoritative enumeration belongs to the host
	/// runtime, so parsing never fails.
	///
	/// [`Unknown`]: AppLifecycleState::Unknown
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"active" => AppLifecycleState::Active,
			"inactive" => AppLifecycleState::Inactive,
			"background" => AppLifecycleState::Background,
			"extension" => AppLifecycleState::Extension,
			_ => AppLifecycleState::Unknown,
		})
	}
}

/// A detected edge between the foreground and background bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	/// App moved from background into a foreground-like state.
	ToForeground,
	/// App moved into the background.
	ToBackground,
}

/// Coalesces raw lifecycle states into band transitions.
///
/// A transition fires only on a genuine band edge: repeating states within
/// the same band return `None`. The tracker starts with no recorded
/// transition, so the very first observation always fires (the synthetic
/// evaluation performed when the signal listener starts).
///
/// Tracking state is never reset; a stopped listener is not expected to be
/// started again.
#[derive(Debug, Default)]
pub struct TransitionTracker {
	last: Option<Transition>,
}

impl TransitionTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Observes a state and returns the transition it produces, if any.
	pub fn observe(&mut self, state: AppLifecycleState) -> Option<Transition> {
		let next = if state.is_background() {
			(self.last != Some(Transition::ToBackground)).then_some(Transition::ToBackground)
		} else {
			(self.last != Some(Transition::ToForeground)).then_some(Transition::ToForeground)
		};

		if next.is_some() {
			self.last = next;
		}
		next
	}

	/// Returns the last transition that fired.
	pub fn last(&self) -> Option<Transition> {
		self.last
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! App-lifecycle signal listener driving synchronization start/stop.
//!
//! Streaming connections must be torn down when the process backgrounds (the
//! OS may suspend socket activity at any point, notably on Android) and
//! resumed on return to foreground. Polling needs no explicit pause: timer
//! callbacks do not fire while backgrounded on the target runtime, so only a
//! re-sync on return to foreground is issued when the engine tracks a
//! polling handle.
//!
//! Flushing buffered data on backgrounding is best-effort and gated by
//! [`Settings::flush_data_on_background`]: without a persistent store the
//! data is lost if the OS then kills the process, but the flush itself may
//! be suspended mid-flight and is never retried here.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use flagship_core::{
	AppLifecycleState, SignalListener, SyncManagerHandle, Transition, TransitionTracker,
};

use crate::host::{AppStateSource, AppStateSubscription};
use crate::settings::Settings;

/// Bridges OS foreground/background notifications to the engine's
/// synchronization start/stop/flush contract.
///
/// `start` evaluates the current state synchronously (a listener started
/// while the app is already backgrounded must pause streaming immediately)
/// and then registers exactly one lifecycle subscription. `stop` drops the
/// subscription and is idempotent. Transition tracking is never reset;
/// starting a stopped listener again is unsupported.
pub struct LifecycleSignalListener {
	inner: Arc<ListenerInner>,
	subscription: Mutex<Option<AppStateSubscription>>,
}

struct ListenerInner {
	sync_manager: Arc<dyn SyncManagerHandle>,
	settings: Arc<Settings>,
	app_state: Arc<dyn AppStateSource>,
	tracker: Mutex<TransitionTracker>,
}

impl ListenerInner {
	fn handle_state_change(&self, state: AppLifecycleState) {
		let transition = self.tracker.lock().observe(state);
		match transition {
			Some(Transition::ToForeground) => {
				debug!(
					state = %state,
					resume_streaming = self.sync_manager.push_manager().is_some(),
					"app transitioned to foreground"
				);
				// On launch the push manager is already started and this is a
				// no-op at the engine level; after a real background stint it
				// resumes the paused streaming connection.
				if let Some(push) = self.sync_manager.push_manager() {
					push.start();
				}
				if let Some(polling) = self.sync_manager.polling_manager() {
					polling.sync_all();
				}
			}
			Some(Transition::ToBackground) => {
				debug!(
					state = %state,
					pause_streaming = self.sync_manager.push_manager().is_some(),
					flush = self.settings.flush_data_on_background,
					"app transitioned to background"
				);
				if let Some(push) = self.sync_manager.push_manager() {
					push.stop();
				}
				// The app always passes through background before the OS or
				// the user evicts it, so this is the last chance to get
				// buffered data out. Completion is not guaranteed.
				if self.settings.flush_data_on_background {
					self.sync_manager.flush();
				}
			}
			None => {}
		}
	}
}

impl LifecycleSignalListener {
	/// Pure wiring; no subscription is registered until [`start`].
	///
	/// [`start`]: SignalListener::start
	pub fn new(
		sync_manager: Arc<dyn SyncManagerHandle>,
		settings: Arc<Settings>,
		app_state: Arc<dyn AppStateSource>,
	) -> Self {
		Self {
			inner: Arc::new(ListenerInner {
				sync_manager,
				settings,
				app_state,
				tracker: Mutex::new(TransitionTracker::new()),
			}),
			subscription: Mutex::new(None),
		}
	}
}

impl SignalListener for LifecycleSignalListener {
	fn start(&self) {
		debug!("registering listener for app state change events");
		// Evaluate the state at start time first: the SDK is normally
		// instantiated in the foreground, but nothing guarantees it.
		let current = self.inner.app_state.current_state();
		self.inner.handle_state_change(current);

		let inner = Arc::clone(&self.inner);
		let subscription = self
			.inner
			.app_state
			.subscribe(Arc::new(move |state| inner.handle_state_change(state)));
		*self.subscription.lock() = Some(subscription);
	}

	fn stop(&self) {
		debug!("deregistering listener for app state change events");
		self.subscription.lock().take();
	}
}

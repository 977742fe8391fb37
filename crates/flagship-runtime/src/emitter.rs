// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic event emitter with guard-based subscriptions.
//!
//! Backs the native bridge's process-wide event channel and the emitter the
//! platform object hands to the engine. Dropping a [`Subscription`] removes
//! the listener; there is no manually tracked list of remove-functions.
//!
//! Dispatch snapshots the listener list before invoking callbacks, so a
//! callback may drop its own subscription (or register new ones) without
//! deadlocking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct EmitterInner<E: 'static> {
	next_id: AtomicU64,
	listeners: Mutex<Vec<(u64, Listener<E>)>>,
}

trait ListenerSet: Send + Sync {
	fn remove(&self, id: u64);
}

impl<E: 'static> ListenerSet for EmitterInner<E> {
	fn remove(&self, id: u64) {
		self.listeners.lock().retain(|(listener_id, _)| *listener_id != id);
	}
}

/// A multi-listener event channel. Cloning shares the listener set.
pub struct EventEmitter<E: 'static> {
	inner: Arc<EmitterInner<E>>,
}

impl<E: 'static> EventEmitter<E> {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(EmitterInner {
				next_id: AtomicU64::new(0),
				listeners: Mutex::new(Vec::new()),
			}),
		}
	}

	/// Registers a listener. The listener stays registered until the
	/// returned guard is dropped.
	pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		self.inner.listeners.lock().push((id, Arc::new(listener)));
		let weak = Arc::downgrade(&self.inner);
		let owner: Weak<dyn ListenerSet> = weak;
		Subscription { id, owner }
	}

	/// Delivers an event to every registered listener, in subscription order.
	pub fn emit(&self, event: &E) {
		let snapshot: Vec<Listener<E>> = {
			let listeners = self.inner.listeners.lock();
			listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
		};
		for listener in snapshot {
			listener(event);
		}
	}

	pub fn listener_count(&self) -> usize {
		self.inner.listeners.lock().len()
	}
}

impl<E: 'static> Default for EventEmitter<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: 'static> Clone for EventEmitter<E> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<E: 'static> fmt::Debug for EventEmitter<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventEmitter")
			.field("listeners", &self.inner.listeners.lock().len())
			.finish()
	}
}

/// Guard for a registered listener. Dropping it unsubscribes.
pub struct Subscription {
	id: u64,
	owner: Weak<dyn ListenerSet>,
}

impl Subscription {
	/// Explicit form of dropping the guard.
	pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(owner) = self.owner.upgrade() {
			owner.remove(self.id);
		}
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}

#![forbid(unsafe_code)]

//! Per-node subscriber registry with RAII guards and isolated dispatch.
//!
//! Subscribers are stored as `Weak` function pointers; the strong `Rc` lives
//! inside the [`Subscription`] guard handed back to the caller. Dropping the
//! guard unsubscribes: the weak entry fails to upgrade and is pruned lazily
//! on the next notification cycle.
//!
//! # Invariants
//!
//! 1. Subscribers are dispatched in insertion order.
//! 2. A panicking subscriber is caught at the dispatch boundary; remaining
//!    subscribers (same node and ancestors) still receive the notification.
//! 3. Dead entries are pruned before each dispatch pass, never during one.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use tracing::warn;

/// Cause label delivered to a subscriber immediately upon registration.
pub const CAUSE_INITIALIZED: &str = "initialized";

/// A subscriber callback, invoked with the cause label of each change.
pub(crate) type CallbackRc = Rc<dyn Fn(&str)>;
type CallbackWeak = Weak<dyn Fn(&str)>;

/// Ordered subscriber storage for one space node.
#[derive(Default)]
pub(crate) struct SubscriberSet {
    entries: Vec<CallbackWeak>,
}

impl SubscriberSet {
    pub(crate) fn push(&mut self, weak: CallbackWeak) {
        self.entries.push(weak);
    }

    /// Prune dead entries and upgrade the live ones, in insertion order.
    pub(crate) fn collect_live(&mut self) -> Vec<CallbackRc> {
        self.entries.retain(|w| w.strong_count() > 0);
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Invoke one subscriber, isolating panics at the dispatch boundary.
///
/// The mutation has already been applied and snapshots invalidated by the
/// time subscribers run, so a failing subscriber cannot roll anything back;
/// it is reported and the pass continues.
pub(crate) fn dispatch(callback: &CallbackRc, cause: &str) {
    if catch_unwind(AssertUnwindSafe(|| callback(cause))).is_err() {
        warn!(cause, "subscriber panicked during notification; continuing");
    }
}

/// RAII guard for a subscriber callback.
///
/// Holds the only strong reference to the callback. Dropping the guard makes
/// the registry's `Weak` entry unresolvable, so the callback is skipped and
/// pruned on the next notification.
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl Subscription {
    pub(crate) fn new(guard: Box<dyn Any>) -> Self {
        Self { _guard: guard }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

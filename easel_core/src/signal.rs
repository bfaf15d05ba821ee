// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed resize notifications.
//!
//! [`ResizeSignal`] is the subscription point drawing routines use to learn
//! about backing-resolution changes. It decouples routines from the
//! controller: a routine subscribes through the [`Frame`](crate::routine::Frame)
//! it receives in `initialize` and never needs a reference to the loop.
//!
//! # Delivery
//!
//! - Listeners are notified in subscription order.
//! - Listeners may subscribe and unsubscribe (themselves or others) while
//!   being notified. A listener removed earlier in a round is not called;
//!   a listener added during a round first hears the next announcement.
//! - [`emit`](ResizeSignal::emit) called from inside a listener is queued and
//!   delivered after the current round, so every listener observes
//!   announcements in the same order.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::surface::ResizeAnnouncement;

/// Identifies one subscription on a [`ResizeSignal`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

type Listener = Box<dyn FnMut(&ResizeAnnouncement)>;

struct Entry {
    id: SubscriptionId,
    listener: Listener,
}

#[derive(Default)]
struct SignalState {
    next_id: u64,
    /// Listeners not currently being notified.
    listeners: Vec<Entry>,
    /// True while a delivery round is in progress.
    emitting: bool,
    /// Ids taken out of `listeners` for the round being delivered.
    in_round: Vec<SubscriptionId>,
    /// Ids unsubscribed during the current round.
    removed: Vec<SubscriptionId>,
    /// Announcements emitted during the current round.
    queued: VecDeque<ResizeAnnouncement>,
}

/// Observer list for [`ResizeAnnouncement`]s.
///
/// Single-threaded; share it with `Rc`.
#[derive(Default)]
pub struct ResizeSignal {
    state: RefCell<SignalState>,
}

impl fmt::Debug for ResizeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ResizeSignal")
            .field("listeners", &state.listeners.len())
            .field("emitting", &state.emitting)
            .field("queued", &state.queued.len())
            .finish_non_exhaustive()
    }
}

impl ResizeSignal {
    /// Creates a signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for every subsequent announcement.
    pub fn subscribe(&self, listener: impl FnMut(&ResizeAnnouncement) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.listeners.push(Entry {
            id,
            listener: Box::new(listener),
        });
        id
    }

    /// The id the next subscription will receive.
    pub(crate) fn next_subscription(&self) -> SubscriptionId {
        SubscriptionId(self.state.borrow().next_id)
    }

    /// Ids handed out from `mark` up to now, live or not.
    pub(crate) fn issued_since(
        &self,
        mark: SubscriptionId,
    ) -> impl Iterator<Item = SubscriptionId> + use<> {
        (mark.0..self.state.borrow().next_id).map(SubscriptionId)
    }

    /// Removes a subscription. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.listeners.iter().position(|e| e.id == id) {
            state.listeners.remove(pos);
            return true;
        }
        if state.in_round.contains(&id) && !state.removed.contains(&id) {
            // The round drops it when it merges back.
            state.removed.push(id);
            return true;
        }
        false
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Delivers `announcement` to every listener.
    pub fn emit(&self, announcement: &ResizeAnnouncement) {
        {
            let mut state = self.state.borrow_mut();
            if state.emitting {
                state.queued.push_back(*announcement);
                return;
            }
            state.emitting = true;
        }

        let mut next = Some(*announcement);
        while let Some(current) = next {
            self.deliver(&current);
            next = self.state.borrow_mut().queued.pop_front();
        }

        let mut state = self.state.borrow_mut();
        state.emitting = false;
        state.removed.clear();
    }

    /// Runs one delivery round with the state borrow released around each
    /// listener call.
    fn deliver(&self, announcement: &ResizeAnnouncement) {
        let round = {
            let mut state = self.state.borrow_mut();
            let round = core::mem::take(&mut state.listeners);
            state.in_round = round.iter().map(|e| e.id).collect();
            round
        };
        let mut keep = Vec::with_capacity(round.len());

        for mut entry in round {
            if self.state.borrow().removed.contains(&entry.id) {
                continue;
            }
            (entry.listener)(announcement);
            keep.push(entry);
        }

        let mut state = self.state.borrow_mut();
        state.in_round.clear();
        let removed = core::mem::take(&mut state.removed);
        keep.retain(|e| !removed.contains(&e.id));
        // Listeners added during the round go after the existing ones.
        keep.append(&mut state.listeners);
        state.listeners = keep;
        // Later queued rounds still need to skip these ids.
        state.removed = removed;
    }
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual-time timer queue.

use alloc::vec::Vec;
use core::time::Duration;

use easel_core::resize::{ResizeTimer, TimerHost};

/// Identifies one armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Clone, Copy, Debug)]
struct Armed {
    id: TimerId,
    timer: ResizeTimer,
    due: Duration,
}

/// A [`TimerHost`] driven by a virtual clock.
///
/// Time only moves through [`pop_due`](Self::pop_due) and
/// [`advance_to`](Self::advance_to). Timers due at the same instant fire in
/// the order they were armed.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Duration,
    next: u64,
    armed: Vec<Armed>,
    set_count: u64,
    cleared_count: u64,
}

impl ManualTimers {
    /// Creates a queue at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    #[must_use]
    pub fn armed(&self) -> usize {
        self.armed.len()
    }

    /// Number of armed timers of the given kind.
    #[must_use]
    pub fn armed_of(&self, timer: ResizeTimer) -> usize {
        self.armed.iter().filter(|a| a.timer == timer).count()
    }

    /// Total timers armed.
    #[must_use]
    pub fn set_count(&self) -> u64 {
        self.set_count
    }

    /// Total armed timers cleared before firing.
    #[must_use]
    pub fn cleared_count(&self) -> u64 {
        self.cleared_count
    }

    /// Removes the earliest timer due at or before `until`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<ResizeTimer> {
        let (pos, armed) = self
            .armed
            .iter()
            .enumerate()
            .filter(|(_, a)| a.due <= until)
            .min_by_key(|(_, a)| (a.due, a.id))?;
        let armed = *armed;
        self.armed.remove(pos);
        self.now = self.now.max(armed.due);
        Some(armed.timer)
    }

    /// Moves the clock forward to `t` without firing anything.
    pub fn advance_to(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}

impl TimerHost for ManualTimers {
    type Handle = TimerId;

    fn set_timeout(&mut self, timer: ResizeTimer, delay: Duration) -> TimerId {
        self.next += 1;
        self.set_count += 1;
        let id = TimerId(self.next);
        self.armed.push(Armed {
            id,
            timer,
            due: self.now + delay,
        });
        id
    }

    fn clear_timeout(&mut self, handle: TimerId) {
        let before = self.armed.len();
        self.armed.retain(|a| a.id != handle);
        if self.armed.len() != before {
            self.cleared_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn pops_in_due_then_arm_order() {
        let mut timers = ManualTimers::new();
        timers.set_timeout(ResizeTimer::Debounce, 100 * MS);
        timers.set_timeout(ResizeTimer::Settle, Duration::ZERO);
        timers.set_timeout(ResizeTimer::Debounce, Duration::ZERO);

        assert_eq!(timers.pop_due(Duration::ZERO), Some(ResizeTimer::Settle));
        assert_eq!(timers.pop_due(Duration::ZERO), Some(ResizeTimer::Debounce));
        assert_eq!(timers.pop_due(99 * MS), None);
        assert_eq!(timers.pop_due(100 * MS), Some(ResizeTimer::Debounce));
        assert_eq!(timers.now(), 100 * MS);
    }

    #[test]
    fn delays_are_relative_to_now() {
        let mut timers = ManualTimers::new();
        timers.advance_to(50 * MS);
        timers.set_timeout(ResizeTimer::Debounce, 100 * MS);
        assert_eq!(timers.pop_due(149 * MS), None);
        assert_eq!(timers.pop_due(150 * MS), Some(ResizeTimer::Debounce));
    }

    #[test]
    fn cleared_timers_never_fire() {
        let mut timers = ManualTimers::new();
        let id = timers.set_timeout(ResizeTimer::Debounce, 10 * MS);
        timers.clear_timeout(id);
        timers.clear_timeout(id);
        assert_eq!(timers.cleared_count(), 1);
        assert_eq!(timers.pop_due(Duration::MAX), None);
        assert_eq!(timers.armed(), 0);
    }
}

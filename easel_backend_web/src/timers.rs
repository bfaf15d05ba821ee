// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` timer host.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::time::Duration;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use easel_core::resize::{ResizeTimer, TimerHost};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(handler: &JsValue, timeout_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

type TimerClosure = Closure<dyn FnMut()>;

/// Identifies an armed `setTimeout` timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeoutHandle(pub i32);

/// Converts a delay to the millisecond argument of `setTimeout`.
pub(crate) fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// Timers armed and not yet fired or cleared, oldest first.
#[derive(Debug, Default)]
pub(crate) struct ArmedTimers {
    armed: Vec<(ResizeTimer, i32)>,
}

impl ArmedTimers {
    pub(crate) fn record(&mut self, timer: ResizeTimer, id: i32) {
        self.armed.push((timer, id));
    }

    pub(crate) fn forget(&mut self, id: i32) {
        self.armed.retain(|&(_, armed)| armed != id);
    }

    /// Forgets the oldest armed timer of this kind. Timers of one kind share
    /// a delay, so they fire in arming order.
    pub(crate) fn fired(&mut self, timer: ResizeTimer) {
        if let Some(pos) = self.armed.iter().position(|&(kind, _)| kind == timer) {
            self.armed.remove(pos);
        }
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = i32> + '_ {
        self.armed.drain(..).map(|(_, id)| id)
    }
}

/// A [`TimerHost`] backed by the global `setTimeout`.
///
/// One JS closure per [`ResizeTimer`] kind is installed with
/// [`set_callback`](Self::set_callback). Dropping the host clears every timer
/// still armed, so the browser never calls a released closure.
#[derive(Default)]
pub struct WindowTimers {
    debounce: Option<TimerClosure>,
    settle: Option<TimerClosure>,
    armed: ArmedTimers,
}

impl core::fmt::Debug for WindowTimers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowTimers")
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

impl WindowTimers {
    /// Creates a host with no callbacks installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the function run when a timer of kind `timer` fires.
    ///
    /// The function must call [`fired`](Self::fired) before routing the
    /// firing to the coordinator.
    pub fn set_callback(&mut self, timer: ResizeTimer, callback: impl FnMut() + 'static) {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        match timer {
            ResizeTimer::Debounce => self.debounce = Some(closure),
            ResizeTimer::Settle => self.settle = Some(closure),
        }
    }

    /// Records that a timer of kind `timer` fired.
    pub fn fired(&mut self, timer: ResizeTimer) {
        self.armed.fired(timer);
    }
}

impl TimerHost for WindowTimers {
    type Handle = TimeoutHandle;

    fn set_timeout(&mut self, timer: ResizeTimer, delay: Duration) -> TimeoutHandle {
        let closure = match timer {
            ResizeTimer::Debounce => &self.debounce,
            ResizeTimer::Settle => &self.settle,
        };
        let Some(closure) = closure else {
            log::warn!("{timer:?} timer armed before a callback was installed");
            return TimeoutHandle(0);
        };
        let id = set_timeout(closure.as_ref().unchecked_ref(), timeout_millis(delay));
        self.armed.record(timer, id);
        TimeoutHandle(id)
    }

    fn clear_timeout(&mut self, handle: TimeoutHandle) {
        clear_timeout(handle.0);
        self.armed.forget(handle.0);
    }
}

impl Drop for WindowTimers {
    fn drop(&mut self) {
        for id in self.armed.drain() {
            clear_timeout(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn millis_saturate() {
        assert_eq!(timeout_millis(Duration::ZERO), 0);
        assert_eq!(timeout_millis(Duration::from_millis(100)), 100);
        assert_eq!(timeout_millis(Duration::from_micros(1_500)), 1);
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX)), i32::MAX);
    }

    #[test]
    fn bookkeeping_tracks_live_timers() {
        let mut armed = ArmedTimers::default();
        armed.record(ResizeTimer::Settle, 1);
        armed.record(ResizeTimer::Debounce, 2);
        armed.record(ResizeTimer::Debounce, 3);
        armed.forget(2);
        armed.fired(ResizeTimer::Settle);
        let live: Vec<i32> = armed.drain().collect();
        assert_eq!(live, vec![3]);
    }
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounced, edge-triggered backing-resolution synchronization.
//!
//! [`ResizeCoordinator`] keeps a surface's backing resolution equal to
//! `floor(display_box * density_ratio)` and announces on the
//! [`ResizeSignal`] only when that value actually changes.
//!
//! # Host wiring
//!
//! The coordinator does not observe layout or own timers itself. The host:
//!
//! 1. calls [`attach`](ResizeCoordinator::attach) once; this recomputes
//!    eagerly and arms a zero-delay [`ResizeTimer::Settle`] attempt for
//!    surfaces that are not in a visible layout tree yet,
//! 2. calls [`layout_changed`](ResizeCoordinator::layout_changed) from its
//!    layout observer (e.g. `ResizeObserver`),
//! 3. routes every timer firing to
//!    [`timer_fired`](ResizeCoordinator::timer_fired).
//!
//! Rapid layout changes inside the debounce window keep re-arming the single
//! pending [`ResizeTimer::Debounce`] timer, so only the final stable size is
//! recomputed.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;
use core::time::Duration;

use crate::signal::ResizeSignal;
use crate::surface::{BackingSize, ResizeAnnouncement, Surface, backing_size_for, effective_density};
use crate::trace::{ResizeEvent, TraceSink, tracer};

/// Which coordinator timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeTimer {
    /// The debounce window after the last layout change elapsed.
    Debounce,
    /// The post-attach retry on the next scheduling turn.
    Settle,
}

/// Timeout primitive provided by the host.
///
/// When a timer armed with [`set_timeout`](Self::set_timeout) fires, the host
/// must call [`ResizeCoordinator::timer_fired`] with the same
/// [`ResizeTimer`].
pub trait TimerHost {
    /// Identifies an armed timer.
    type Handle: Copy + fmt::Debug;

    /// Arms `timer` to fire after `delay`.
    fn set_timeout(&mut self, timer: ResizeTimer, delay: Duration) -> Self::Handle;

    /// Disarms a timer. Clearing a timer that already fired is a no-op.
    fn clear_timeout(&mut self, handle: Self::Handle);
}

/// Configuration for the [`ResizeCoordinator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResizeConfig {
    /// Quiet period after the last layout change before recomputing.
    pub debounce: Duration,
}

impl ResizeConfig {
    /// Default configuration for the browser.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            debounce: Duration::from_millis(100),
        }
    }
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// Keeps one surface's backing resolution in step with its display box.
pub struct ResizeCoordinator<S, H: TimerHost> {
    surface: S,
    signal: Rc<ResizeSignal>,
    config: ResizeConfig,
    /// Last announced backing size; `0×0` until the first announcement.
    last: BackingSize,
    /// The at-most-one pending debounce timer.
    pending: Option<H::Handle>,
    sink: Option<Box<dyn TraceSink>>,
}

impl<S, H: TimerHost> fmt::Debug for ResizeCoordinator<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeCoordinator")
            .field("config", &self.config)
            .field("last", &self.last)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<S: Surface, H: TimerHost> ResizeCoordinator<S, H> {
    /// Creates a coordinator for `surface` that announces on `signal`.
    ///
    /// Nothing is computed until [`attach`](Self::attach).
    #[must_use]
    pub fn new(surface: S, signal: Rc<ResizeSignal>, config: ResizeConfig) -> Self {
        Self {
            surface,
            signal,
            config,
            last: BackingSize::ZERO,
            pending: None,
            sink: None,
        }
    }

    /// Starts coordinating: recomputes now and once more on the next
    /// scheduling turn.
    ///
    /// Returns the announcement made by the eager attempt, if any.
    pub fn attach(&mut self, timers: &mut H) -> Option<ResizeAnnouncement> {
        let announced = self.recompute();
        timers.set_timeout(ResizeTimer::Settle, Duration::ZERO);
        announced
    }

    /// Records a layout change, restarting the debounce window.
    pub fn layout_changed(&mut self, timers: &mut H) {
        if let Some(handle) = self.pending.take() {
            timers.clear_timeout(handle);
        }
        self.pending = Some(timers.set_timeout(ResizeTimer::Debounce, self.config.debounce));
    }

    /// Handles a timer firing routed back by the host.
    pub fn timer_fired(&mut self, timer: ResizeTimer) -> Option<ResizeAnnouncement> {
        if timer == ResizeTimer::Debounce {
            self.pending = None;
        }
        self.recompute()
    }

    /// Recomputes the backing resolution from the surface's current display
    /// box and density ratio.
    ///
    /// Returns (and emits) an announcement only when the computed size
    /// differs from the last announced one. A surface that is not laid out
    /// yet is skipped silently.
    pub fn recompute(&mut self) -> Option<ResizeAnnouncement> {
        let display_box = self.surface.display_box();
        let density_ratio = effective_density(self.surface.density_ratio());
        let Some(size) = backing_size_for(display_box, density_ratio) else {
            log::trace!("resize skipped: surface not laid out ({display_box:?})");
            return None;
        };
        if size == self.last {
            return None;
        }

        self.surface.set_backing_size(size);
        self.last = size;

        let announcement = ResizeAnnouncement::new(size, density_ratio);
        log::debug!(
            "surface resized to {}x{} (density {})",
            size.width,
            size.height,
            density_ratio
        );
        tracer(&mut self.sink).resize(&ResizeEvent {
            announcement,
            synthetic: false,
        });
        self.signal.emit(&announcement);
        Some(announcement)
    }

    /// Stops coordinating, disarming a pending debounce timer.
    pub fn detach(&mut self, timers: &mut H) {
        if let Some(handle) = self.pending.take() {
            timers.clear_timeout(handle);
        }
    }

    /// Installs a trace sink for announcements, returning the previous one.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) -> Option<Box<dyn TraceSink>> {
        self.sink.replace(sink)
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    /// Last announced backing size.
    #[must_use]
    pub fn last_size(&self) -> BackingSize {
        self.last
    }

    /// Returns `true` while a debounce timer is armed.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The coordinated surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The signal announcements are emitted on.
    #[must_use]
    pub fn signal(&self) -> &Rc<ResizeSignal> {
        &self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use kurbo::Size;

    struct TestSurface {
        display: Cell<Size>,
        density: Cell<f64>,
        backing: Cell<BackingSize>,
        writes: Cell<u32>,
    }

    impl TestSurface {
        fn new(w: f64, h: f64, density: f64) -> Rc<Self> {
            Rc::new(Self {
                display: Cell::new(Size::new(w, h)),
                density: Cell::new(density),
                backing: Cell::new(BackingSize::ZERO),
                writes: Cell::new(0),
            })
        }
    }

    impl Surface for TestSurface {
        type Context = ();

        fn context(&self) -> Option<()> {
            Some(())
        }

        fn display_box(&self) -> Size {
            self.display.get()
        }

        fn density_ratio(&self) -> f64 {
            self.density.get()
        }

        fn backing_size(&self) -> BackingSize {
            self.backing.get()
        }

        fn set_backing_size(&self, size: BackingSize) {
            self.writes.set(self.writes.get() + 1);
            self.backing.set(size);
        }

        fn clear(&self, _context: &(), _size: BackingSize) {}
    }

    #[derive(Default)]
    struct TestTimers {
        next: u32,
        armed: Vec<(u32, ResizeTimer, Duration)>,
        cleared: Vec<u32>,
    }

    impl TimerHost for TestTimers {
        type Handle = u32;

        fn set_timeout(&mut self, timer: ResizeTimer, delay: Duration) -> u32 {
            self.next += 1;
            self.armed.push((self.next, timer, delay));
            self.next
        }

        fn clear_timeout(&mut self, handle: u32) {
            self.cleared.push(handle);
            self.armed.retain(|&(h, ..)| h != handle);
        }
    }

    fn recording_signal() -> (Rc<ResizeSignal>, Rc<RefCell<Vec<ResizeAnnouncement>>>) {
        let signal = Rc::new(ResizeSignal::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        signal.subscribe(move |a| sink.borrow_mut().push(*a));
        (signal, seen)
    }

    type Coordinator = ResizeCoordinator<Rc<TestSurface>, TestTimers>;

    #[test]
    fn announcements_are_edge_triggered() {
        let surface = TestSurface::new(0.0, 0.0, 1.0);
        let (signal, seen) = recording_signal();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());

        for (w, h) in [(100.0, 100.0), (100.0, 100.0), (200.0, 150.0), (200.0, 150.0)] {
            surface.display.set(Size::new(w, h));
            coord.recompute();
        }

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2, "repeats are silent");
        assert_eq!(seen[0].size(), BackingSize::new(100, 100));
        assert_eq!(seen[1].size(), BackingSize::new(200, 150));
        assert_eq!(surface.writes.get(), 2, "backing written only on change");
    }

    #[test]
    fn applies_density_to_backing_size() {
        let surface = TestSurface::new(150.0, 100.0, 2.0);
        let (signal, seen) = recording_signal();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());

        let a = coord.recompute().unwrap();
        assert_eq!(a.size(), BackingSize::new(300, 200));
        assert_eq!(a.density_ratio, 2.0);
        assert_eq!(surface.backing.get(), BackingSize::new(300, 200));
        assert_eq!(coord.last_size(), BackingSize::new(300, 200));
        assert_eq!(seen.borrow().len(), 1);

        // Same box, new density is an effective change.
        surface.density.set(1.0);
        let a = coord.recompute().unwrap();
        assert_eq!(a.size(), BackingSize::new(150, 100));
    }

    #[test]
    fn unlaid_out_surface_is_skipped() {
        let surface = TestSurface::new(0.0, 240.0, 1.0);
        let (signal, seen) = recording_signal();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());

        assert_eq!(coord.recompute(), None);
        assert!(seen.borrow().is_empty());
        assert_eq!(surface.writes.get(), 0);
        assert_eq!(coord.last_size(), BackingSize::ZERO);
    }

    #[test]
    fn debounce_keeps_a_single_pending_timer() {
        let surface = TestSurface::new(10.0, 10.0, 1.0);
        let (signal, seen) = recording_signal();
        let mut timers = TestTimers::default();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());

        for w in [20.0, 30.0, 40.0, 50.0] {
            surface.display.set(Size::new(w, 10.0));
            coord.layout_changed(&mut timers);
        }

        assert!(coord.has_pending());
        assert_eq!(timers.armed.len(), 1, "earlier timers were cleared");
        assert_eq!(timers.cleared, vec![1, 2, 3]);
        let (_, kind, delay) = timers.armed[0];
        assert_eq!(kind, ResizeTimer::Debounce);
        assert_eq!(delay, Duration::from_millis(100));
        assert!(seen.borrow().is_empty(), "nothing recomputed yet");

        let a = coord.timer_fired(ResizeTimer::Debounce).unwrap();
        assert_eq!(a.size(), BackingSize::new(50, 10), "uses the last observed size");
        assert!(!coord.has_pending());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn attach_recomputes_eagerly_and_arms_settle() {
        let surface = TestSurface::new(64.0, 48.0, 1.0);
        let (signal, seen) = recording_signal();
        let mut timers = TestTimers::default();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());

        let eager = coord.attach(&mut timers);
        assert_eq!(eager.map(|a| a.size()), Some(BackingSize::new(64, 48)));
        assert_eq!(timers.armed, vec![(1, ResizeTimer::Settle, Duration::ZERO)]);
        assert!(!coord.has_pending(), "settle is not the debounce timer");

        // The settle attempt sees the same size and stays quiet.
        assert_eq!(coord.timer_fired(ResizeTimer::Settle), None);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn settle_covers_late_layout() {
        let surface = TestSurface::new(0.0, 0.0, 1.0);
        let (signal, seen) = recording_signal();
        let mut timers = TestTimers::default();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());

        assert_eq!(coord.attach(&mut timers), None, "not in layout yet");
        surface.display.set(Size::new(320.0, 200.0));
        let a = coord.timer_fired(ResizeTimer::Settle).unwrap();
        assert_eq!(a.size(), BackingSize::new(320, 200));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn announcements_are_traced() {
        #[derive(Default)]
        struct Sizes(Vec<(BackingSize, bool)>);
        impl TraceSink for Sizes {
            fn on_resize(&mut self, e: &ResizeEvent) {
                self.0.push((e.announcement.size(), e.synthetic));
            }
        }

        let surface = TestSurface::new(40.0, 30.0, 1.0);
        let (signal, _seen) = recording_signal();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());
        let sizes = Rc::new(RefCell::new(Sizes::default()));
        coord.set_trace_sink(Box::new(Rc::clone(&sizes)));

        coord.recompute();
        coord.recompute();
        assert_eq!(sizes.borrow().0, vec![(BackingSize::new(40, 30), false)]);
    }

    #[test]
    fn detach_clears_pending_debounce() {
        let surface = TestSurface::new(10.0, 10.0, 1.0);
        let (signal, _seen) = recording_signal();
        let mut timers = TestTimers::default();
        let mut coord = Coordinator::new(Rc::clone(&surface), signal, ResizeConfig::web());

        coord.layout_changed(&mut timers);
        coord.detach(&mut timers);
        assert!(!coord.has_pending());
        assert!(timers.armed.is_empty());

        // Detaching again has nothing to clear.
        coord.detach(&mut timers);
        assert_eq!(timers.cleared, vec![1]);
    }
}

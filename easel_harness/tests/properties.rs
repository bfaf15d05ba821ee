// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of the coordinator and loop through the headless host.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use easel_core::backend::LoopHandle;
use easel_core::error::RoutineError;
use easel_core::render_loop::{LoopConfig, LoopState};
use easel_core::resize::{ResizeConfig, ResizeTimer};
use easel_core::routine::{DrawingRoutine, Frame};
use easel_core::surface::{BackingSize, ResizeAnnouncement, Surface as _};
use easel_core::trace::RoutinePhase;
use easel_harness::{DeltaTracker, Harness, HeadlessContext, HeadlessSurface};
use kurbo::Size;

const MS: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Init(&'static str, BackingSize),
    Draw {
        routine: &'static str,
        size: BackingSize,
        delta: f64,
        total: f64,
    },
    Heard(&'static str, ResizeAnnouncement),
}

type Log = Rc<RefCell<Vec<Event>>>;

/// Records every call and subscribes to resize announcements on initialize.
struct Probe {
    name: &'static str,
    log: Log,
    fail_draw: bool,
}

impl Probe {
    fn boxed(name: &'static str, log: &Log) -> Box<Self> {
        Box::new(Self {
            name,
            log: Rc::clone(log),
            fail_draw: false,
        })
    }
}

impl DrawingRoutine<HeadlessContext> for Probe {
    fn initialize(&mut self, frame: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        self.log
            .borrow_mut()
            .push(Event::Init(self.name, frame.size()));
        let log = Rc::clone(&self.log);
        let name = self.name;
        frame
            .resize
            .subscribe(move |a| log.borrow_mut().push(Event::Heard(name, *a)));
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        self.log.borrow_mut().push(Event::Draw {
            routine: self.name,
            size: frame.size(),
            delta: frame.delta_elapsed,
            total: frame.total_elapsed,
        });
        if self.fail_draw {
            return Err(RoutineError::new("probe asked to fail"));
        }
        Ok(())
    }
}

fn harness(display: Size, density: f64, log: &Log) -> Harness {
    Harness::new(HeadlessSurface::new(display, density), Probe::boxed("a", log)).unwrap()
}

fn draws(log: &Log) -> Vec<(BackingSize, f64, f64)> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Draw {
                size, delta, total, ..
            } => Some((*size, *delta, *total)),
            _ => None,
        })
        .collect()
}

fn heard(log: &Log, name: &str) -> Vec<ResizeAnnouncement> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Heard(n, a) if *n == name => Some(*a),
            _ => None,
        })
        .collect()
}

#[test]
fn first_tick_of_a_run_is_cold() {
    let log = Log::default();
    let mut h = harness(Size::new(10.0, 10.0), 1.0, &log);
    h.start();
    assert!(h.pump_frame(48_213.7));
    assert!(h.pump_frame(48_230.4));
    let d = draws(&log);
    assert_eq!(d[0].1, 0.0, "cold start");
    assert!((d[1].1 - 0.0167).abs() < 1e-9, "second delta {}", d[1].1);
}

#[test]
fn total_elapsed_telescopes() {
    let log = Log::default();
    let mut h = harness(Size::new(10.0, 10.0), 1.0, &log);
    h.start();
    let first = h.now_ms();
    let stamps = [first, first + 16.0, first + 33.0, first + 50.0, first + 120.0];
    for &t in &stamps {
        h.pump_frame(t);
    }
    for (k, (_, _, total)) in draws(&log).into_iter().enumerate() {
        let expected = (stamps[k] - stamps[0]) / 1000.0;
        assert!((total - expected).abs() < 1e-9, "step {k}: {total} vs {expected}");
    }
}

#[test]
fn announcements_are_edge_triggered() {
    let log = Log::default();
    let mut h = harness(Size::new(50.0, 50.0), 2.0, &log);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    h.signal().subscribe(move |a| s.borrow_mut().push(a.size()));

    // (100, 100)
    h.attach();
    // (100, 100) again from the settle attempt.
    h.advance(Duration::ZERO);
    // (200, 150)
    h.resize_display(Size::new(100.0, 75.0));
    h.advance(100 * MS);
    // (200, 150) again.
    h.resize_display(Size::new(100.0, 75.0));
    h.advance(100 * MS);

    assert_eq!(
        *seen.borrow(),
        vec![BackingSize::new(100, 100), BackingSize::new(200, 150)]
    );
    assert_eq!(h.surface().backing_writes(), 2, "unchanged size is not rewritten");
}

#[test]
fn layout_bursts_coalesce_into_one_recompute() {
    let log = Log::default();
    let mut h = harness(Size::new(100.0, 100.0), 1.0, &log);
    h.attach();
    h.advance(Duration::ZERO);
    assert_eq!(h.surface().backing_writes(), 1);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    h.signal().subscribe(move |a| s.borrow_mut().push(a.size()));

    for step in 1..=8_u32 {
        h.resize_display(Size::new(100.0 + f64::from(step) * 10.0, 100.0));
        assert_eq!(h.timers().armed_of(ResizeTimer::Debounce), 1, "single pending");
        h.advance(20 * MS);
    }
    assert!(seen.borrow().is_empty(), "still inside the window");

    h.advance(80 * MS);
    assert_eq!(*seen.borrow(), vec![BackingSize::new(180, 100)], "last size wins");
    assert_eq!(h.surface().backing_writes(), 2);
    assert!(!h.coordinator().has_pending());
}

#[test]
fn settle_attempt_covers_late_layout() {
    let log = Log::default();
    let mut h = harness(Size::ZERO, 1.5, &log);
    assert_eq!(h.attach(), None, "not laid out yet");

    // Inserted into the layout tree before the next scheduling turn, with no
    // layout notification.
    h.surface().set_display_box(Size::new(200.0, 100.0));
    assert_eq!(h.advance(Duration::ZERO), 1);
    assert_eq!(h.surface().backing_size(), BackingSize::new(300, 150));
}

#[test]
fn switch_initializes_then_reannounces_current_size() {
    let log = Log::default();
    let mut h = harness(Size::new(150.0, 100.0), 2.0, &log);
    h.attach();
    h.start();
    h.run_frames(3, 16 * MS);
    log.borrow_mut().clear();

    h.switch_routine(Probe::boxed("b", &log));

    let expected = ResizeAnnouncement::new(BackingSize::new(300, 200), 2.0);
    let events = log.borrow().clone();
    assert_eq!(events[0], Event::Init("b", BackingSize::new(300, 200)));
    assert!(
        events[1..].contains(&Event::Heard("b", expected)),
        "new routine hears the synthetic announcement: {events:?}"
    );
    assert_eq!(heard(&log, "a"), vec![expected], "previous subscriber too");

    h.run_frames(1, 16 * MS);
    let d = draws(&log);
    assert_eq!(d.len(), 1);
    assert_eq!(
        log.borrow().last(),
        Some(&Event::Draw {
            routine: "b",
            size: BackingSize::new(300, 200),
            delta: d[0].1,
            total: d[0].2,
        })
    );
}

#[test]
fn stop_is_idempotent() {
    let log = Log::default();
    let mut h = harness(Size::new(10.0, 10.0), 1.0, &log);
    h.stop();
    h.stop();
    assert!(!h.pump_frame(1_000.0), "nothing scheduled");

    h.start();
    h.pump_frame(1_016.0);
    h.stop();
    h.stop();
    assert_eq!(h.render_loop().requester().outstanding(), 0);
    assert!(!h.pump_frame(1_032.0));
    assert_eq!(draws(&log).len(), 1);
}

#[test]
fn restart_re_arms_cold_start() {
    let log = Log::default();
    let mut h = harness(Size::new(10.0, 10.0), 1.0, &log);
    h.start();
    h.run_frames(5, 16 * MS);
    h.stop();
    h.advance(500 * MS);
    h.start();
    h.run_frames(1, 16 * MS);

    let d = draws(&log);
    assert_eq!(d.len(), 6);
    assert_eq!(d[5].1, 0.0, "first tick after restart");
    assert_eq!(d[5].2, 0.0);
}

#[test]
fn at_most_one_frame_outstanding() {
    let log = Log::default();
    let mut h = harness(Size::new(10.0, 10.0), 1.0, &log);
    h.start();
    h.start();
    for _ in 0..10 {
        assert_eq!(h.render_loop().requester().outstanding(), 1);
        h.run_frames(1, 16 * MS);
    }
    h.switch_routine(Probe::boxed("b", &log));
    assert_eq!(h.render_loop().requester().outstanding(), 1);
}

#[test]
fn start_when_sized_waits_for_layout() {
    let log = Log::default();
    let mut h = harness(Size::ZERO, 1.0, &log);
    h.start_when_sized();
    h.attach();
    h.advance(Duration::ZERO);
    assert!(!h.is_running());

    h.resize_display(Size::new(320.0, 240.0));
    h.advance(100 * MS);
    assert!(h.is_running());

    h.run_frames(1, 16 * MS);
    assert_eq!(draws(&log), vec![(BackingSize::new(320, 240), 0.0, 0.0)]);
    assert_eq!(h.signal().listener_count(), 1, "only the probe remains");
}

#[test]
fn stop_leaves_resize_tracking_alone() {
    let log = Log::default();
    let mut h = harness(Size::new(10.0, 10.0), 1.0, &log);
    h.attach();
    h.start();
    h.resize_display(Size::new(20.0, 20.0));
    h.stop();
    h.advance(100 * MS);
    assert_eq!(h.surface().backing_size(), BackingSize::new(20, 20));
    assert_eq!(h.render_loop().state(), LoopState::Idle);
}

#[test]
fn resize_lands_between_frames() {
    let log = Log::default();
    let mut h = harness(Size::new(100.0, 50.0), 1.0, &log);
    h.attach();
    h.start();
    h.run_frames(1, 16 * MS);
    h.resize_display(Size::new(200.0, 50.0));
    // The debounce timer falls due during the last interval.
    h.run_frames(7, 16 * MS);

    let sizes: Vec<_> = draws(&log).into_iter().map(|(s, _, _)| s).collect();
    assert_eq!(sizes[0], BackingSize::new(100, 50));
    assert_eq!(sizes.last(), Some(&BackingSize::new(200, 50)));
    let first_new = sizes.iter().position(|s| s.width == 200).unwrap();
    assert!(
        sizes[first_new..].iter().all(|s| s.width == 200),
        "no half-updated size: {sizes:?}"
    );
}

#[test]
fn faulting_routine_halts_the_loop() {
    let log = Log::default();
    let mut routine = Probe::boxed("bad", &log);
    routine.fail_draw = true;
    let mut h = Harness::with_config(
        HeadlessSurface::new(Size::new(10.0, 10.0), 1.0),
        routine,
        ResizeConfig::web(),
        LoopConfig::web(),
    )
    .unwrap();

    h.start();
    assert_eq!(h.run_frames(3, 16 * MS), 1, "halted after the first frame");
    assert!(!h.is_running());
    let render = h.render_loop();
    let fault = render.last_fault().unwrap();
    assert_eq!(fault.phase, RoutinePhase::Draw);
    assert_eq!(fault.frame_index, 1);
    assert_eq!(render.requester().outstanding(), 0);
}

#[test]
fn missing_context_fails_construction() {
    let log = Log::default();
    let result = Harness::new(
        HeadlessSurface::without_context(Size::new(10.0, 10.0), 1.0),
        Probe::boxed("a", &log),
    );
    assert!(result.is_err());
    assert!(log.borrow().is_empty());
}

#[test]
fn delta_tracker_follows_run() {
    let log = Log::default();
    let mut h = harness(Size::new(10.0, 10.0), 1.0, &log);
    let mut tracker = DeltaTracker::<8>::new(20.0);
    h.start();
    for i in 0..12 {
        let interval = if i == 6 { 50 * MS } else { 16 * MS };
        h.run_frames(1, interval);
        tracker.observe(&h.render_loop().frame_time());
    }
    let report = tracker.report();
    assert_eq!(report.total_frames, 12);
    assert_eq!(report.long_frames, 1);
    assert!((report.max_ms - 50.0).abs() < 1e-6, "max {}", report.max_ms);
}

/// Keeps its layout behind a weak resize listener, the way canvas routines
/// cache size-dependent state.
#[derive(Default)]
struct Follower {
    layout: Rc<RefCell<BackingSize>>,
}

impl DrawingRoutine<HeadlessContext> for Follower {
    fn initialize(&mut self, frame: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        let weak = Rc::downgrade(&self.layout);
        frame.resize.subscribe(move |a| {
            if let Some(layout) = weak.upgrade() {
                *layout.borrow_mut() = a.size();
            }
        });
        Ok(())
    }

    fn draw_frame(&mut self, _: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        Ok(())
    }
}

#[test]
fn repeated_switches_keep_listeners_bounded() {
    let mut h = Harness::new(
        HeadlessSurface::new(Size::new(64.0, 48.0), 1.0),
        Box::new(Follower::default()),
    )
    .unwrap();
    h.attach();
    h.start();
    assert_eq!(h.signal().listener_count(), 1);

    for _ in 0..1000 {
        h.switch_routine(Box::new(Follower::default()));
        h.run_frames(1, 16 * MS);
    }
    assert_eq!(h.signal().listener_count(), 1, "only the active routine");
}

#[test]
fn default_bitmap_does_not_count_as_laid_out() {
    let log = Log::default();
    let mut h = harness(Size::ZERO, 1.0, &log);
    h.surface().set_backing_size(BackingSize::new(300, 150));
    h.start_when_sized();
    assert!(!h.is_running(), "no layout yet");

    h.attach();
    h.resize_display(Size::new(200.0, 100.0));
    h.advance(100 * MS);
    assert!(h.is_running());
    assert_eq!(h.surface().backing_size(), BackingSize::new(200, 100));
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless render loop that exercises the tracing and diagnostics pipeline.
//!
//! Drives a [`Harness`] through a late first layout, a resize burst, a few
//! long frames, a routine switch to a routine that faults periodically, and a
//! density change. Events go to both a
//! [`PrettyPrintSink`](easel_debug::pretty::PrettyPrintSink) on stdout and a
//! [`ChromeTraceSink`](easel_debug::chrome::ChromeTraceSink), which is then
//! exported as Chrome trace JSON.
//!
//! Usage: `trace_demo [OUTPUT.json]` (defaults to `easel_trace.json`). Set
//! `RUST_LOG=debug` to see the loop's own log output.

use std::cell::{Cell, RefCell};
use std::error::Error;
use std::f64::consts::{PI, TAU};
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::rc::Rc;
use std::time::Duration;

use easel_core::backend::LoopHandle as _;
use easel_core::error::RoutineError;
use easel_core::render_loop::LoopConfig;
use easel_core::resize::ResizeConfig;
use easel_core::routine::{DrawingRoutine, Frame};
use easel_core::trace::{
    FrameTickEvent, LifecycleEvent, ResizeEvent, RoutineFaultEvent, TraceSink,
};
use easel_debug::chrome::ChromeTraceSink;
use easel_debug::pretty::PrettyPrintSink;
use easel_harness::{DeltaTracker, Harness, HeadlessContext, HeadlessSurface};
use kurbo::Size;

/// ≈60 Hz.
const FRAME: Duration = Duration::from_micros(16_667);
const HISTORY: usize = 48;

/// Forwards every event to each inner sink.
struct Fanout(Vec<Box<dyn TraceSink>>);

impl TraceSink for Fanout {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        for sink in &mut self.0 {
            sink.on_frame_tick(e);
        }
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        for sink in &mut self.0 {
            sink.on_lifecycle(e);
        }
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        for sink in &mut self.0 {
            sink.on_resize(e);
        }
    }

    fn on_routine_fault(&mut self, e: &RoutineFaultEvent<'_>) {
        for sink in &mut self.0 {
            sink.on_routine_fault(e);
        }
    }
}

/// Tiles the surface with 32px cells, re-laid-out on every resize.
#[derive(Default)]
struct Grid {
    cells: Rc<Cell<u32>>,
    painted: u64,
}

impl DrawingRoutine<HeadlessContext> for Grid {
    fn initialize(&mut self, frame: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        let cells = Rc::clone(&self.cells);
        frame.resize.subscribe(move |announcement| {
            cells.set((announcement.width / 32) * (announcement.height / 32));
            log::debug!("grid relaid out: {} cells", cells.get());
        });
        Ok(())
    }

    fn draw_frame(&mut self, _: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        self.painted += u64::from(self.cells.get());
        log::trace!("{} cells painted so far", self.painted);
        Ok(())
    }
}

/// Spins at a fixed angular rate and fails every `period`-th frame.
struct Flaky {
    period: u64,
    frames: u64,
    angle: f64,
}

impl DrawingRoutine<HeadlessContext> for Flaky {
    fn initialize(&mut self, frame: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        log::info!("flaky routine starting at {}x{}", frame.width, frame.height);
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Frame<'_, HeadlessContext>) -> Result<(), RoutineError> {
        self.frames += 1;
        self.angle = (self.angle + frame.delta_elapsed * PI) % TAU;
        if self.frames.is_multiple_of(self.period) {
            return Err(RoutineError::new(format!(
                "simulated fault at angle {:.2}",
                self.angle
            )));
        }
        Ok(())
    }
}

/// A pretty printer on stdout plus the shared Chrome sink.
fn stdout_and(chrome: &Rc<RefCell<ChromeTraceSink>>) -> Box<dyn TraceSink> {
    let sinks: Vec<Box<dyn TraceSink>> = vec![
        Box::new(PrettyPrintSink::new(Box::new(std::io::stdout()))),
        Box::new(Rc::clone(chrome)),
    ];
    Box::new(Fanout(sinks))
}

fn run(
    harness: &mut Harness,
    tracker: &mut DeltaTracker<HISTORY>,
    count: usize,
    interval: Duration,
) {
    for _ in 0..count {
        harness.advance(interval);
        if harness.pump_frame(harness.now_ms()) {
            tracker.observe(&harness.render_loop().frame_time());
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "easel_trace.json".to_owned());

    // -- sinks -------------------------------------------------------------
    let chrome = Rc::new(RefCell::new(ChromeTraceSink::new()));

    // -- harness -----------------------------------------------------------
    let config = LoopConfig {
        stop_on_fault: false,
        ..LoopConfig::web()
    };
    let mut harness = Harness::with_config(
        HeadlessSurface::new(Size::ZERO, 2.0),
        Box::new(Grid::default()),
        ResizeConfig::web(),
        config,
    )?;
    // The loop traces ticks, lifecycle, faults, and synthetic resizes; the
    // coordinator traces layout-driven resizes.
    harness.render_loop_mut().set_trace_sink(stdout_and(&chrome));
    harness.set_resize_trace_sink(stdout_and(&chrome));
    let mut tracker = DeltaTracker::<HISTORY>::new(16.7);

    // 1. Not laid out yet: attach announces nothing; the loop waits.
    harness.start_when_sized();
    harness.attach();
    harness.advance(FRAME);
    println!("-- waiting for layout (running: {})", harness.is_running());

    // 2. First layout lands and settles.
    harness.resize_display(Size::new(320.0, 180.0));
    harness.advance(ResizeConfig::web().debounce);
    println!("-- laid out (running: {})", harness.is_running());
    run(&mut harness, &mut tracker, 30, FRAME);

    // 3. Resize burst: one layout change per frame, then a quiet period.
    println!("-- resize burst");
    for step in 1..=5_u32 {
        let grow = f64::from(step) * 40.0;
        harness.resize_display(Size::new(320.0 + grow, 180.0 + grow / 2.0));
        run(&mut harness, &mut tracker, 1, FRAME);
    }
    run(&mut harness, &mut tracker, 10, FRAME);

    // 4. A few long frames.
    println!("-- hitch");
    run(&mut harness, &mut tracker, 3, Duration::from_millis(50));
    run(&mut harness, &mut tracker, 10, FRAME);

    // 5. Hot swap to a routine that faults every 7th frame.
    println!("-- switch routine");
    harness.switch_routine(Box::new(Flaky {
        period: 7,
        frames: 0,
        angle: 0.0,
    }));
    run(&mut harness, &mut tracker, 20, FRAME);

    // 6. Moved to a 1x display.
    println!("-- density change");
    harness.set_density_ratio(1.0);
    run(&mut harness, &mut tracker, 10, FRAME);

    harness.stop();

    // -- report ------------------------------------------------------------
    let report = tracker.report();
    println!();
    println!(
        "frames={} long={} mean={:.2}ms max={:.2}ms",
        report.total_frames, report.long_frames, report.mean_ms, report.max_ms
    );
    println!("deltas [{}]", tracker.sparkline_ascii(0.0, 50.0));
    if let Some(fault) = harness.render_loop().last_fault() {
        println!("last fault: frame {} ({})", fault.frame_index, fault.error);
    }

    let mut writer = BufWriter::new(File::create(&output)?);
    chrome.borrow().write_to(&mut writer)?;
    writer.flush()?;
    println!(
        "wrote {} trace events to {output}",
        chrome.borrow().events().len()
    );
    Ok(())
}

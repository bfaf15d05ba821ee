// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`ChromeTraceSink`] collects trace events as they happen and
//! [`write_to`](ChromeTraceSink::write_to) writes them as
//! [Chrome Trace Event Format][spec] JSON.
//!
//! Only frame ticks carry a host timestamp. Lifecycle, resize, and fault
//! events are stamped with the most recent tick's time.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use easel_core::trace::{
    FrameTickEvent, LifecycleEvent, ResizeEvent, RoutineFaultEvent, TraceSink,
};

/// Collects events for Chrome Trace Event Format export.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
#[derive(Debug, Default)]
pub struct ChromeTraceSink {
    events: Vec<Value>,
    last_ts_us: f64,
}

impl ChromeTraceSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events collected so far.
    #[must_use]
    pub fn events(&self) -> &[Value] {
        &self.events
    }

    /// Discards collected events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Writes the collected events as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(writer, &self.events)?;
        Ok(())
    }

    fn instant(&mut self, name: &str, cat: &str, scope: &str, args: Value) {
        self.events.push(json!({
            "ph": "i",
            "name": name,
            "cat": cat,
            "ts": self.last_ts_us,
            "pid": 0,
            "tid": 0,
            "s": scope,
            "args": args,
        }));
    }
}

impl TraceSink for ChromeTraceSink {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        self.last_ts_us = e.timestamp_ms * 1000.0;
        self.instant(
            "FrameTick",
            "Loop",
            "t",
            json!({
                "frame_index": e.frame_index,
                "width": e.width,
                "height": e.height,
                "total_elapsed_s": e.total_elapsed,
            }),
        );
        self.events.push(json!({
            "ph": "C",
            "name": "delta_ms",
            "cat": "Loop",
            "ts": self.last_ts_us,
            "pid": 0,
            "tid": 0,
            "args": { "delta_ms": e.delta_elapsed * 1000.0 },
        }));
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.instant(
            &format!("{:?}", e.kind),
            "Lifecycle",
            "g",
            json!({ "frame_index": e.frame_index }),
        );
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.instant(
            "Resize",
            "Resize",
            "g",
            json!({
                "width": e.announcement.width,
                "height": e.announcement.height,
                "density_ratio": e.announcement.density_ratio,
                "synthetic": e.synthetic,
            }),
        );
    }

    fn on_routine_fault(&mut self, e: &RoutineFaultEvent<'_>) {
        self.instant(
            "RoutineFault",
            "Fault",
            "g",
            json!({
                "frame_index": e.frame_index,
                "phase": format!("{:?}", e.phase),
                "message": e.error.message(),
            }),
        );
    }
}

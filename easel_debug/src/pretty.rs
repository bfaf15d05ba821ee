// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use easel_core::trace::{
    FrameTickEvent, LifecycleEvent, LifecycleKind, ResizeEvent, RoutineFaultEvent, RoutinePhase,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// The destination.
    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Consumes the sink, returning the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn lifecycle_name(kind: LifecycleKind) -> &'static str {
    match kind {
        LifecycleKind::Started => "started",
        LifecycleKind::Stopped => "stopped",
        LifecycleKind::RoutineSwitched => "routine-switched",
        LifecycleKind::Halted => "HALTED",
    }
}

fn phase_name(phase: RoutinePhase) -> &'static str {
    match phase {
        RoutinePhase::Initialize => "initialize",
        RoutinePhase::Draw => "draw",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} at={:.1}ms dt={:.1}ms total={:.3}s size={}x{}",
            e.frame_index,
            e.timestamp_ms,
            e.delta_elapsed * 1000.0,
            e.total_elapsed,
            e.width,
            e.height,
        );
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        let _ = writeln!(
            self.writer,
            "[loop] {} frame={}",
            lifecycle_name(e.kind),
            e.frame_index,
        );
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        let origin = if e.synthetic { " (synthetic)" } else { "" };
        let _ = writeln!(
            self.writer,
            "[resize] {}x{} density={}{origin}",
            e.announcement.width, e.announcement.height, e.announcement.density_ratio,
        );
    }

    fn on_routine_fault(&mut self, e: &RoutineFaultEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[fault] frame={} phase={}: {}",
            e.frame_index,
            phase_name(e.phase),
            e.error,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::error::RoutineError;
    use easel_core::surface::{BackingSize, ResizeAnnouncement};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn tick_line() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_frame_tick(&FrameTickEvent {
            frame_index: 7,
            timestamp_ms: 1_016.0,
            delta_elapsed: 0.016,
            total_elapsed: 0.1,
            width: 640,
            height: 480,
        });
        assert_eq!(
            output(sink),
            "[tick] frame=7 at=1016.0ms dt=16.0ms total=0.100s size=640x480\n"
        );
    }

    #[test]
    fn lifecycle_resize_and_fault_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_lifecycle(&LifecycleEvent {
            kind: LifecycleKind::RoutineSwitched,
            frame_index: 3,
        });
        sink.on_resize(&ResizeEvent {
            announcement: ResizeAnnouncement::new(BackingSize::new(300, 200), 2.0),
            synthetic: true,
        });
        let error = RoutineError::new("no gradient");
        sink.on_routine_fault(&RoutineFaultEvent {
            frame_index: 4,
            phase: RoutinePhase::Draw,
            error: &error,
        });
        let text = output(sink);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "[loop] routine-switched frame=3",
                "[resize] 300x200 density=2 (synthetic)",
                "[fault] frame=4 phase=draw: no gradient",
            ]
        );
    }
}

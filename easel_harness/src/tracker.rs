// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling frame-delta history.

use alloc::string::String;

use easel_core::clock::FrameTime;

/// Aggregated report returned by [`DeltaTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeltaReport {
    /// Total frames observed.
    pub total_frames: u64,
    /// Frames whose delta exceeded the tracker's budget.
    pub long_frames: u64,
    /// Mean delta over the history window, in milliseconds.
    pub mean_ms: f64,
    /// Largest delta in the history window, in milliseconds.
    pub max_ms: f64,
}

/// Fixed-size ring buffer of frame deltas with a per-frame budget.
#[derive(Debug)]
pub struct DeltaTracker<const N: usize> {
    deltas_ms: [f64; N],
    cursor: usize,
    budget_ms: f64,
    total_frames: u64,
    long_frames: u64,
}

impl<const N: usize> Default for DeltaTracker<N> {
    fn default() -> Self {
        Self::new(16.67)
    }
}

impl<const N: usize> DeltaTracker<N> {
    /// Creates a tracker whose history is prefilled with `budget_ms`.
    ///
    /// Frames longer than `budget_ms` count as long frames.
    #[must_use]
    pub const fn new(budget_ms: f64) -> Self {
        Self {
            deltas_ms: [budget_ms; N],
            cursor: 0,
            budget_ms,
            total_frames: 0,
            long_frames: 0,
        }
    }

    /// Observes one frame's timing.
    ///
    /// The zero delta of a cold-start frame is recorded as-is and never
    /// counts as long.
    pub fn observe(&mut self, time: &FrameTime) -> DeltaReport {
        let delta_ms = time.delta_elapsed * 1000.0;
        self.total_frames = self.total_frames.saturating_add(1);
        if N > 0 {
            self.deltas_ms[self.cursor] = delta_ms;
            self.cursor = (self.cursor + 1) % N;
        }
        if delta_ms > self.budget_ms {
            self.long_frames = self.long_frames.saturating_add(1);
        }
        self.report()
    }

    /// Summarizes the current window.
    #[must_use]
    pub fn report(&self) -> DeltaReport {
        let (sum, max) = self
            .deltas_ms
            .iter()
            .fold((0.0, 0.0_f64), |(sum, max), &d| (sum + d, max.max(d)));
        let mean_ms = if N == 0 { 0.0 } else { sum / N as f64 };
        DeltaReport {
            total_frames: self.total_frames,
            long_frames: self.long_frames,
            mean_ms,
            max_ms: max,
        }
    }

    /// Returns ring-buffer frame deltas oldest→newest.
    #[must_use]
    pub fn frame_deltas(&self) -> [f64; N] {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.deltas_ms[(self.cursor + i) % N];
        }
        out
    }

    /// Returns an ASCII sparkline over [`frame_deltas`](Self::frame_deltas).
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let span = (max_ms - min_ms).max(f64::EPSILON);
        let mut out = String::with_capacity(N);
        for v in self.frame_deltas() {
            let t = (v.clamp(min_ms, max_ms) - min_ms) / span;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "t is in [0, 1]; index is clamped to the level count"
            )]
            let level = ((t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize).min(LEVELS.len() - 1);
            out.push(LEVELS[level] as char);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(delta_s: f64) -> FrameTime {
        FrameTime {
            last_timestamp: 1.0,
            total_elapsed: 0.0,
            delta_elapsed: delta_s,
        }
    }

    #[test]
    fn long_frames_accumulate() {
        let mut t = DeltaTracker::<8>::new(20.0);
        for i in 0..10 {
            let delta = if i < 3 { 0.050 } else { 0.016 };
            t.observe(&at(delta));
        }
        let report = t.report();
        assert_eq!(report.total_frames, 10);
        assert_eq!(report.long_frames, 3);
    }

    #[test]
    fn window_is_oldest_to_newest() {
        let mut t = DeltaTracker::<3>::new(16.0);
        t.observe(&at(0.001));
        t.observe(&at(0.002));
        t.observe(&at(0.003));
        t.observe(&at(0.004));
        let d = t.frame_deltas();
        assert!((d[0] - 2.0).abs() < 1e-9);
        assert!((d[2] - 4.0).abs() < 1e-9);
        assert!((t.report().max_ms - 4.0).abs() < 1e-9);
    }

    #[test]
    fn sparkline_spans_levels() {
        let mut t = DeltaTracker::<4>::new(0.0);
        t.observe(&at(0.0));
        t.observe(&at(0.002));
        t.observe(&at(0.020));
        t.observe(&at(0.040));
        assert_eq!(t.sparkline_ascii(0.0, 20.0), " .@@");
    }
}

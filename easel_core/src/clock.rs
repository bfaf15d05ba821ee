// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame Clock: raw timestamps to elapsed-time deltas.
//!
//! Hosts deliver one timestamp per frame in milliseconds since an arbitrary
//! epoch (e.g. a `DOMHighResTimeStamp` from `requestAnimationFrame`).
//! [`compute_frame_time`] folds that stream into a [`FrameTime`] measured in
//! seconds.
//!
//! A `last_timestamp` of `0.0` is the sentinel for "no prior frame observed",
//! so the first tick after a (re)start always reports a zero delta.

/// Elapsed-time state for one run of the render loop, in seconds.
///
/// Reset to [`FrameTime::ZERO`] each time the loop starts and advanced once
/// per tick with [`compute_frame_time`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Timestamp of the most recent tick, in milliseconds (`0.0` before the
    /// first tick).
    pub last_timestamp: f64,
    /// Seconds accumulated since the run started.
    pub total_elapsed: f64,
    /// Seconds between the two most recent ticks.
    pub delta_elapsed: f64,
}

impl FrameTime {
    /// The cold-start state: no prior frame, nothing elapsed.
    pub const ZERO: Self = Self {
        last_timestamp: 0.0,
        total_elapsed: 0.0,
        delta_elapsed: 0.0,
    };

    /// Returns `true` if no tick has been observed since the last reset.
    #[inline]
    #[must_use]
    pub fn is_cold(&self) -> bool {
        self.last_timestamp == 0.0
    }

    /// Advances this state by one tick. Equivalent to
    /// [`compute_frame_time(self, timestamp_ms)`](compute_frame_time).
    #[inline]
    #[must_use]
    pub fn advance(self, timestamp_ms: f64) -> Self {
        compute_frame_time(self, timestamp_ms)
    }
}

/// Computes the next [`FrameTime`] from the previous state and the current
/// timestamp in milliseconds.
///
/// - When `previous` is cold, `delta_elapsed` is zero.
/// - Otherwise `delta_elapsed = (timestamp_ms - previous.last_timestamp) / 1000`.
///   A timestamp that runs backwards yields a zero delta rather than a
///   negative one, so `total_elapsed` never decreases.
///
/// Pure and deterministic.
#[must_use]
pub fn compute_frame_time(previous: FrameTime, timestamp_ms: f64) -> FrameTime {
    let delta_elapsed = if previous.is_cold() {
        0.0
    } else {
        ((timestamp_ms - previous.last_timestamp) / 1000.0).max(0.0)
    };

    FrameTime {
        last_timestamp: timestamp_ms,
        total_elapsed: previous.total_elapsed + delta_elapsed,
        delta_elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn cold_start_has_zero_delta() {
        for t in [0.5, 16.7, 1_000.0, 987_654.321] {
            let ft = compute_frame_time(FrameTime::ZERO, t);
            assert_eq!(ft.delta_elapsed, 0.0, "cold start at {t}");
            assert_eq!(ft.total_elapsed, 0.0, "cold start at {t}");
            assert_eq!(ft.last_timestamp, t, "timestamp recorded");
        }
    }

    #[test]
    fn cold_start_ignores_carried_total() {
        // A cold state only means "no prior timestamp"; the total carries.
        let prev = FrameTime {
            last_timestamp: 0.0,
            total_elapsed: 2.5,
            delta_elapsed: 0.1,
        };
        let ft = compute_frame_time(prev, 5_000.0);
        assert_eq!(ft.delta_elapsed, 0.0, "no prior frame");
        assert_eq!(ft.total_elapsed, 2.5, "total unchanged");
    }

    #[test]
    fn delta_is_converted_to_seconds() {
        let first = compute_frame_time(FrameTime::ZERO, 1_000.0);
        let second = compute_frame_time(first, 1_016.0);
        assert!(approx(second.delta_elapsed, 0.016), "16ms → 0.016s");
        assert!(approx(second.total_elapsed, 0.016), "total");
    }

    #[test]
    fn total_telescopes_over_increasing_timestamps() {
        let stamps = [120.0, 136.6, 153.3, 170.0, 250.0, 251.0, 1_300.0];
        let mut ft = FrameTime::ZERO;
        for &t in &stamps {
            ft = ft.advance(t);
            let expected = (t - stamps[0]) / 1000.0;
            assert!(
                approx(ft.total_elapsed, expected),
                "at {t}: got {}, expected {expected}",
                ft.total_elapsed
            );
        }
    }

    #[test]
    fn backwards_timestamp_does_not_decrease_total() {
        let ft = FrameTime::ZERO.advance(2_000.0).advance(2_100.0);
        let back = ft.advance(2_050.0);
        assert_eq!(back.delta_elapsed, 0.0, "clamped");
        assert_eq!(back.total_elapsed, ft.total_elapsed, "non-decreasing");
        assert_eq!(back.last_timestamp, 2_050.0, "timestamp still recorded");
    }
}

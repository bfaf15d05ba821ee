// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic headless host for demos and tests.
//!
//! - [`HeadlessSurface`]: display box and density ratio set by the caller
//! - [`ManualFrames`]: frame requests fire only when pumped
//! - [`ManualTimers`]: debounce/settle timers on a virtual clock
//! - [`Harness`]: all of the above wired to a coordinator and a loop
//! - [`DeltaTracker`]: rolling frame-delta history with an ASCII sparkline

#![no_std]

extern crate alloc;

mod frames;
mod harness;
mod surface;
mod timers;
mod tracker;

pub use frames::{FrameId, ManualFrames};
pub use harness::{Harness, HeadlessLoop, TIMESTAMP_ORIGIN_MS};
pub use surface::{HeadlessContext, HeadlessSurface};
pub use timers::{ManualTimers, TimerId};
pub use tracker::{DeltaReport, DeltaTracker};

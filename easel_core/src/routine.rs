// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing-routine contract.
//!
//! A [`DrawingRoutine`] is the visual content plugged into the render loop.
//! It owns no scheduling logic: the loop calls
//! [`initialize`](DrawingRoutine::initialize) once when the routine becomes
//! active and [`draw_frame`](DrawingRoutine::draw_frame) on every tick.
//!
//! Routines that cache size-dependent layout subscribe to
//! [`Frame::resize`] during `initialize` and recompute on each
//! [`ResizeAnnouncement`](crate::surface::ResizeAnnouncement). The loop
//! re-announces the current size right after activating a routine, so the
//! cache is always populated before the first `draw_frame`.

use crate::error::RoutineError;
use crate::signal::ResizeSignal;
use crate::surface::BackingSize;

/// Per-tick snapshot handed to the active routine.
///
/// Borrowed for the duration of one call; routines cannot retain it.
#[derive(Debug)]
pub struct Frame<'a, C> {
    /// Drawing context of the surface.
    pub context: &'a C,
    /// Resize notifications for the surface.
    pub resize: &'a ResizeSignal,
    /// Backing width in device pixels, read fresh this tick.
    pub width: u32,
    /// Backing height in device pixels, read fresh this tick.
    pub height: u32,
    /// Seconds since the previous tick (zero on the first tick of a run).
    pub delta_elapsed: f64,
    /// Seconds since the run started.
    pub total_elapsed: f64,
}

impl<C> Frame<'_, C> {
    /// Backing size of this frame.
    #[must_use]
    pub fn size(&self) -> BackingSize {
        BackingSize::new(self.width, self.height)
    }
}

/// Visual content driven by the render loop.
pub trait DrawingRoutine<C> {
    /// One-time setup when the routine becomes active.
    ///
    /// Runs at loop construction for the initial routine and on every
    /// [`switch_routine`](crate::render_loop::RenderLoop::switch_routine).
    fn initialize(&mut self, frame: &Frame<'_, C>) -> Result<(), RoutineError>;

    /// Draws one frame.
    fn draw_frame(&mut self, frame: &Frame<'_, C>) -> Result<(), RoutineError>;
}

impl<C, R: DrawingRoutine<C> + ?Sized> DrawingRoutine<C> for alloc::boxed::Box<R> {
    fn initialize(&mut self, frame: &Frame<'_, C>) -> Result<(), RoutineError> {
        (**self).initialize(frame)
    }

    fn draw_frame(&mut self, frame: &Frame<'_, C>) -> Result<(), RoutineError> {
        (**self).draw_frame(frame)
    }
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the render loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`RenderLoop`](crate::render_loop::RenderLoop) calls at each stage. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::error::RoutineError;
use crate::surface::ResizeAnnouncement;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which lifecycle transition happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    /// `start()` armed scheduling (also on a restart while running).
    Started,
    /// `stop()` moved a running loop to idle.
    Stopped,
    /// A new routine became active.
    RoutineSwitched,
    /// A routine fault stopped the loop.
    Halted,
}

/// Which routine entry point was running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoutinePhase {
    /// [`DrawingRoutine::initialize`](crate::routine::DrawingRoutine::initialize).
    Initialize,
    /// [`DrawingRoutine::draw_frame`](crate::routine::DrawingRoutine::draw_frame).
    Draw,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per tick, before the routine draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTickEvent {
    /// Monotonic tick counter across the loop's lifetime.
    pub frame_index: u64,
    /// Host timestamp of the tick, in milliseconds.
    pub timestamp_ms: f64,
    /// Seconds since the previous tick.
    pub delta_elapsed: f64,
    /// Seconds since the run started.
    pub total_elapsed: f64,
    /// Backing width read for this tick.
    pub width: u32,
    /// Backing height read for this tick.
    pub height: u32,
}

/// Emitted on start, stop, routine switch, and fault-induced halt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// What happened.
    pub kind: LifecycleKind,
    /// Tick counter at the time of the transition.
    pub frame_index: u64,
}

/// Emitted when the loop announces a size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeEvent {
    /// The announcement.
    pub announcement: ResizeAnnouncement,
    /// `true` when re-announced after a routine switch rather than caused by
    /// a layout change.
    pub synthetic: bool,
}

/// Emitted when a routine reports a fault.
#[derive(Clone, Copy, Debug)]
pub struct RoutineFaultEvent<'a> {
    /// Tick counter when the fault happened.
    pub frame_index: u64,
    /// Which entry point failed.
    pub phase: RoutinePhase,
    /// The reported error.
    pub error: &'a RoutineError,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the render loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called on every tick.
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        _ = e;
    }

    /// Called on lifecycle transitions.
    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        _ = e;
    }

    /// Called when a size is announced.
    fn on_resize(&mut self, e: &ResizeEvent) {
        _ = e;
    }

    /// Called when a routine reports a fault.
    fn on_routine_fault(&mut self, e: &RoutineFaultEvent<'_>) {
        _ = e;
    }
}

/// A sink shared with the code that reads it back after the run.
impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        self.borrow_mut().on_frame_tick(e);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.borrow_mut().on_lifecycle(e);
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.borrow_mut().on_resize(e);
    }

    fn on_routine_fault(&mut self, e: &RoutineFaultEvent<'_>) {
        self.borrow_mut().on_routine_fault(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameTickEvent`].
    #[inline]
    pub fn frame_tick(&mut self, e: &FrameTickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LifecycleEvent`].
    #[inline]
    pub fn lifecycle(&mut self, e: &LifecycleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_lifecycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResizeEvent`].
    #[inline]
    pub fn resize(&mut self, e: &ResizeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_resize(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RoutineFaultEvent`].
    #[inline]
    pub fn routine_fault(&mut self, e: &RoutineFaultEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_routine_fault(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

/// Borrows an optional owned sink as a [`Tracer`].
pub(crate) fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink.as_deref_mut() {
        Some(sink) => Tracer::new(sink),
        None => Tracer::none(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

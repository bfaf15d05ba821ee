// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render Loop Controller.
//!
//! [`RenderLoop`] owns the active [`DrawingRoutine`], the per-run
//! [`FrameTime`], and the running/idle lifecycle. The host delivers each
//! scheduled frame to [`RenderLoop::tick`]; the loop computes timing, clears
//! the surface, invokes the routine, and requests the next frame.
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──start()──► Running ──stop()──► Idle
//!                       │  ▲
//!                       │  └── start() (restart: timing resets)
//!                       └── routine fault with stop_on_fault ──► Idle
//! ```
//!
//! At most one frame request is outstanding at any time. `stop()` cancels it
//! so no further tick reaches the routine, and a tick delivered while idle is
//! ignored.
//!
//! # Routine faults
//!
//! A routine returning `Err` is reported as a [`FaultReport`]: to the fault
//! handler (if set), the trace sink, and the `log` facade at error level. The
//! most recent report stays available from [`RenderLoop::last_fault`]. With
//! [`LoopConfig::stop_on_fault`] set, a fault while running halts the loop.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::clock::{FrameTime, compute_frame_time};
use crate::error::{LoopError, RoutineError};
use crate::routine::{DrawingRoutine, Frame};
use crate::signal::{ResizeSignal, SubscriptionId};
use crate::surface::{BackingSize, ResizeAnnouncement, Surface, effective_density};
use crate::trace::{
    FrameTickEvent, LifecycleEvent, LifecycleKind, ResizeEvent, RoutineFaultEvent, RoutinePhase,
    TraceSink, tracer,
};

/// Per-frame scheduling primitive provided by the host.
///
/// When a requested frame fires, the host calls [`RenderLoop::tick`] with the
/// frame's timestamp in milliseconds.
pub trait FrameRequester {
    /// Identifies an outstanding frame request.
    type Handle: Copy + fmt::Debug;

    /// Requests one frame callback.
    fn request_frame(&mut self) -> Self::Handle;

    /// Cancels an outstanding request. Cancelling a request that already
    /// fired is a no-op.
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Running state of a [`RenderLoop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// No frame is scheduled.
    #[default]
    Idle,
    /// Exactly one frame is scheduled.
    Running,
}

/// Configuration for a [`RenderLoop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    /// Clear the full backing area before every `draw_frame`.
    pub clear_each_frame: bool,
    /// Move to [`LoopState::Idle`] when the routine reports a fault while
    /// running.
    pub stop_on_fault: bool,
}

impl LoopConfig {
    /// Default configuration for the browser.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            clear_each_frame: true,
            stop_on_fault: true,
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::web()
    }
}

/// A routine fault as observed by the loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaultReport {
    /// Which routine entry point failed.
    pub phase: RoutinePhase,
    /// Tick counter when the fault happened (`0` before the first tick).
    pub frame_index: u64,
    /// The error the routine returned.
    pub error: RoutineError,
}

type FaultHandler = Box<dyn FnMut(&FaultReport)>;

/// Drives a [`DrawingRoutine`] once per host frame.
pub struct RenderLoop<S: Surface, R: FrameRequester> {
    surface: S,
    context: S::Context,
    requester: R,
    routine: Box<dyn DrawingRoutine<S::Context>>,
    signal: Rc<ResizeSignal>,
    config: LoopConfig,
    state: LoopState,
    time: FrameTime,
    /// The at-most-one outstanding frame request.
    pending: Option<R::Handle>,
    frame_index: u64,
    last_fault: Option<FaultReport>,
    fault_handler: Option<FaultHandler>,
    sink: Option<Box<dyn TraceSink>>,
    /// Subscriptions the active routine made through its frames.
    routine_subscriptions: Vec<SubscriptionId>,
}

impl<S: Surface, R: FrameRequester> fmt::Debug for RenderLoop<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderLoop")
            .field("state", &self.state)
            .field("time", &self.time)
            .field("pending", &self.pending)
            .field("frame_index", &self.frame_index)
            .field("config", &self.config)
            .field("last_fault", &self.last_fault)
            .finish_non_exhaustive()
    }
}

impl<S: Surface, R: FrameRequester> RenderLoop<S, R> {
    /// Creates an idle loop drawing `routine` into `surface`.
    ///
    /// Acquires the drawing context and initializes the routine with the
    /// surface's current backing size (possibly `0×0`) and zero timing. A
    /// routine fault during this initialization is reported, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::ContextUnavailable`] if the surface cannot
    /// provide a drawing context.
    pub fn new(
        surface: S,
        requester: R,
        routine: Box<dyn DrawingRoutine<S::Context>>,
        signal: Rc<ResizeSignal>,
        config: LoopConfig,
    ) -> Result<Self, LoopError> {
        let context = surface.context().ok_or(LoopError::ContextUnavailable)?;
        let mut this = Self {
            surface,
            context,
            requester,
            routine,
            signal,
            config,
            state: LoopState::Idle,
            time: FrameTime::ZERO,
            pending: None,
            frame_index: 0,
            last_fault: None,
            fault_handler: None,
            sink: None,
            routine_subscriptions: Vec::new(),
        };
        this.initialize_routine();
        Ok(this)
    }

    /// Starts (or restarts) the loop.
    ///
    /// Timing resets, so the next tick reports `delta_elapsed == 0`. A frame
    /// already scheduled is cancelled and replaced by a fresh request.
    pub fn start(&mut self) {
        self.cancel_pending();
        self.time = FrameTime::ZERO;
        self.pending = Some(self.requester.request_frame());
        self.state = LoopState::Running;
        log::debug!("render loop started at frame {}", self.frame_index);
        self.lifecycle(LifecycleKind::Started);
    }

    /// Stops the loop, cancelling the outstanding frame request.
    ///
    /// Stopping an idle loop does nothing.
    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.state == LoopState::Running {
            self.state = LoopState::Idle;
            log::debug!("render loop stopped at frame {}", self.frame_index);
            self.lifecycle(LifecycleKind::Stopped);
        }
    }

    /// Handles one host frame callback.
    ///
    /// Ignored while idle. Otherwise advances the Frame Clock, clears the
    /// surface (if configured), draws, and requests the next frame.
    pub fn tick(&mut self, timestamp_ms: f64) {
        if self.state != LoopState::Running {
            log::trace!("frame callback at {timestamp_ms}ms ignored: loop is idle");
            return;
        }
        // The request that delivered this tick has fired.
        self.pending = None;

        self.time = compute_frame_time(self.time, timestamp_ms);
        self.frame_index += 1;
        let size = self.surface.backing_size();

        tracer(&mut self.sink).frame_tick(&FrameTickEvent {
            frame_index: self.frame_index,
            timestamp_ms,
            delta_elapsed: self.time.delta_elapsed,
            total_elapsed: self.time.total_elapsed,
            width: size.width,
            height: size.height,
        });

        if self.config.clear_each_frame {
            self.surface.clear(&self.context, size);
        }

        let mark = self.signal.next_subscription();
        let frame = frame(&self.context, &self.signal, size, &self.time);
        let drawn = self.routine.draw_frame(&frame);
        self.routine_subscriptions.extend(self.signal.issued_since(mark));
        if let Err(error) = drawn {
            self.report_fault(RoutinePhase::Draw, error);
            if self.state != LoopState::Running {
                return;
            }
        }

        self.pending = Some(self.requester.request_frame());
    }

    /// Replaces the active routine without stopping the loop.
    ///
    /// The new routine is initialized with the surface's current size, then
    /// the current size is re-announced on the resize signal so routines that
    /// cache size-dependent state recompute it. The next tick draws with the
    /// new routine.
    ///
    /// Resize listeners the previous routine subscribed through its frames
    /// hear that announcement too and are then unsubscribed.
    pub fn switch_routine(&mut self, routine: Box<dyn DrawingRoutine<S::Context>>) {
        let retired = core::mem::take(&mut self.routine_subscriptions);
        self.routine = routine;
        log::debug!("drawing routine switched at frame {}", self.frame_index);
        self.lifecycle(LifecycleKind::RoutineSwitched);
        self.initialize_routine();

        let announcement = ResizeAnnouncement::new(
            self.surface.backing_size(),
            effective_density(self.surface.density_ratio()),
        );
        tracer(&mut self.sink).resize(&ResizeEvent {
            announcement,
            synthetic: true,
        });
        self.signal.emit(&announcement);

        for id in retired {
            self.signal.unsubscribe(id);
        }
    }

    /// Installs a trace sink, returning the previous one.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) -> Option<Box<dyn TraceSink>> {
        self.sink.replace(sink)
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    /// Installs a callback invoked for every routine fault.
    pub fn set_fault_handler(&mut self, handler: impl FnMut(&FaultReport) + 'static) {
        self.fault_handler = Some(Box::new(handler));
    }

    /// Current running state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Returns `true` while a frame is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Timing state after the most recent tick.
    #[must_use]
    pub fn frame_time(&self) -> FrameTime {
        self.time
    }

    /// Number of ticks delivered to a routine since construction.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The outstanding frame request, if any.
    #[must_use]
    pub fn pending_frame(&self) -> Option<R::Handle> {
        self.pending
    }

    /// Most recent routine fault.
    #[must_use]
    pub fn last_fault(&self) -> Option<&FaultReport> {
        self.last_fault.as_ref()
    }

    /// Clears and returns the most recent routine fault.
    pub fn take_fault(&mut self) -> Option<FaultReport> {
        self.last_fault.take()
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// The surface being drawn into.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The resize signal handed to routines.
    #[must_use]
    pub fn signal(&self) -> &Rc<ResizeSignal> {
        &self.signal
    }

    /// The host frame requester.
    #[must_use]
    pub fn requester(&self) -> &R {
        &self.requester
    }

    /// Mutable access to the host frame requester.
    pub fn requester_mut(&mut self) -> &mut R {
        &mut self.requester
    }

    fn initialize_routine(&mut self) {
        let size = self.surface.backing_size();
        let mark = self.signal.next_subscription();
        let frame = frame(&self.context, &self.signal, size, &self.time);
        let initialized = self.routine.initialize(&frame);
        self.routine_subscriptions.extend(self.signal.issued_since(mark));
        if let Err(error) = initialized {
            self.report_fault(RoutinePhase::Initialize, error);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.requester.cancel_frame(handle);
        }
    }

    fn lifecycle(&mut self, kind: LifecycleKind) {
        tracer(&mut self.sink).lifecycle(&LifecycleEvent {
            kind,
            frame_index: self.frame_index,
        });
    }

    fn report_fault(&mut self, phase: RoutinePhase, error: RoutineError) {
        log::error!(
            "drawing routine failed during {phase:?} at frame {}: {error}",
            self.frame_index
        );
        let report = FaultReport {
            phase,
            frame_index: self.frame_index,
            error,
        };
        tracer(&mut self.sink).routine_fault(&RoutineFaultEvent {
            frame_index: report.frame_index,
            phase,
            error: &report.error,
        });
        if let Some(handler) = &mut self.fault_handler {
            handler(&report);
        }
        self.last_fault = Some(report);

        if self.state == LoopState::Running && self.config.stop_on_fault {
            self.cancel_pending();
            self.state = LoopState::Idle;
            log::warn!("render loop halted after routine fault");
            self.lifecycle(LifecycleKind::Halted);
        }
    }
}

fn frame<'a, C>(
    context: &'a C,
    resize: &'a ResizeSignal,
    size: BackingSize,
    time: &FrameTime,
) -> Frame<'a, C> {
    Frame {
        context,
        resize,
        width: size.width,
        height: size.height,
        delta_elapsed: time.delta_elapsed,
        total_elapsed: time.total_elapsed,
    }
}

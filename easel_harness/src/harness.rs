// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A fully wired headless host.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use core::time::Duration;

use easel_core::backend::{LoopHandle, start_when_sized};
use easel_core::error::LoopError;
use easel_core::render_loop::{LoopConfig, RenderLoop};
use easel_core::resize::{ResizeConfig, ResizeCoordinator};
use easel_core::routine::DrawingRoutine;
use easel_core::signal::ResizeSignal;
use easel_core::surface::ResizeAnnouncement;
use easel_core::trace::TraceSink;
use kurbo::Size;

use crate::frames::ManualFrames;
use crate::surface::{HeadlessContext, HeadlessSurface};
use crate::timers::ManualTimers;

/// Frame timestamps are offset by this origin so virtual time zero never
/// produces a zero timestamp.
pub const TIMESTAMP_ORIGIN_MS: f64 = 1_000.0;

/// The render loop type driven by a [`Harness`].
pub type HeadlessLoop = RenderLoop<Rc<HeadlessSurface>, ManualFrames>;

/// A surface, resize coordinator, and render loop wired together, with
/// virtual time.
///
/// Layout changes go through [`resize_display`](Self::resize_display) and
/// [`set_density_ratio`](Self::set_density_ratio); timers fire during
/// [`advance`](Self::advance); frames fire during
/// [`pump_frame`](Self::pump_frame).
pub struct Harness {
    surface: Rc<HeadlessSurface>,
    signal: Rc<ResizeSignal>,
    coordinator: ResizeCoordinator<Rc<HeadlessSurface>, ManualTimers>,
    timers: ManualTimers,
    render: Rc<RefCell<HeadlessLoop>>,
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("surface", &self.surface)
            .field("coordinator", &self.coordinator)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

impl Harness {
    /// Creates a harness with browser-default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::ContextUnavailable`] if `surface` has no drawing
    /// context.
    pub fn new(
        surface: HeadlessSurface,
        routine: Box<dyn DrawingRoutine<HeadlessContext>>,
    ) -> Result<Self, LoopError> {
        Self::with_config(surface, routine, ResizeConfig::web(), LoopConfig::web())
    }

    /// Creates a harness with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::ContextUnavailable`] if `surface` has no drawing
    /// context.
    pub fn with_config(
        surface: HeadlessSurface,
        routine: Box<dyn DrawingRoutine<HeadlessContext>>,
        resize: ResizeConfig,
        config: LoopConfig,
    ) -> Result<Self, LoopError> {
        let surface = Rc::new(surface);
        let signal = Rc::new(ResizeSignal::new());
        let render = RenderLoop::new(
            Rc::clone(&surface),
            ManualFrames::new(),
            routine,
            Rc::clone(&signal),
            config,
        )?;
        let coordinator = ResizeCoordinator::new(Rc::clone(&surface), Rc::clone(&signal), resize);
        Ok(Self {
            surface,
            signal,
            coordinator,
            timers: ManualTimers::new(),
            render: Rc::new(RefCell::new(render)),
        })
    }

    /// Attaches the resize coordinator: one eager attempt now, one settle
    /// attempt on the next [`advance`](Self::advance).
    pub fn attach(&mut self) -> Option<ResizeAnnouncement> {
        self.coordinator.attach(&mut self.timers)
    }

    /// Detaches the resize coordinator.
    pub fn detach(&mut self) {
        self.coordinator.detach(&mut self.timers);
    }

    /// Changes the display box and reports a layout change.
    pub fn resize_display(&mut self, display: Size) {
        self.surface.set_display_box(display);
        self.coordinator.layout_changed(&mut self.timers);
    }

    /// Changes the density ratio and reports a layout change.
    pub fn set_density_ratio(&mut self, density_ratio: f64) {
        self.surface.set_density_ratio(density_ratio);
        self.coordinator.layout_changed(&mut self.timers);
    }

    /// Moves virtual time forward by `by`, firing every timer that falls due.
    ///
    /// Returns the number of announcements made.
    pub fn advance(&mut self, by: Duration) -> usize {
        let target = self.timers.now() + by;
        let mut announced = 0;
        while let Some(timer) = self.timers.pop_due(target) {
            if self.coordinator.timer_fired(timer).is_some() {
                announced += 1;
            }
        }
        self.timers.advance_to(target);
        announced
    }

    /// Fires the outstanding frame request at `timestamp_ms`.
    ///
    /// Returns `false` (and does nothing) if no frame was requested.
    pub fn pump_frame(&mut self, timestamp_ms: f64) -> bool {
        let mut render = self.render.borrow_mut();
        if render.requester_mut().fire().is_none() {
            return false;
        }
        render.tick(timestamp_ms);
        true
    }

    /// Runs `count` frame intervals: advances virtual time by `interval`,
    /// then pumps a frame stamped with the new virtual time.
    ///
    /// Returns the number of frames actually delivered.
    pub fn run_frames(&mut self, count: usize, interval: Duration) -> usize {
        let mut delivered = 0;
        for _ in 0..count {
            self.advance(interval);
            if self.pump_frame(self.now_ms()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Current virtual time as a frame timestamp in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        TIMESTAMP_ORIGIN_MS + self.timers.now().as_secs_f64() * 1_000.0
    }

    /// Installs a trace sink on the resize coordinator, returning the
    /// previous one. The loop's own sink is set through
    /// [`render_loop_mut`](Self::render_loop_mut).
    pub fn set_resize_trace_sink(
        &mut self,
        sink: Box<dyn TraceSink>,
    ) -> Option<Box<dyn TraceSink>> {
        self.coordinator.set_trace_sink(sink)
    }

    /// Starts the loop once the surface is first sized.
    pub fn start_when_sized(&self) {
        start_when_sized(&self.render);
    }

    /// The surface.
    #[must_use]
    pub fn surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    /// The resize signal shared by the coordinator and the loop.
    #[must_use]
    pub fn signal(&self) -> &Rc<ResizeSignal> {
        &self.signal
    }

    /// The resize coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &ResizeCoordinator<Rc<HeadlessSurface>, ManualTimers> {
        &self.coordinator
    }

    /// The timer queue.
    #[must_use]
    pub fn timers(&self) -> &ManualTimers {
        &self.timers
    }

    /// Borrows the render loop.
    ///
    /// # Panics
    ///
    /// Panics if the loop is currently mutably borrowed.
    #[must_use]
    pub fn render_loop(&self) -> Ref<'_, HeadlessLoop> {
        self.render.borrow()
    }

    /// Mutably borrows the render loop.
    ///
    /// # Panics
    ///
    /// Panics if the loop is currently borrowed.
    #[must_use]
    pub fn render_loop_mut(&self) -> RefMut<'_, HeadlessLoop> {
        self.render.borrow_mut()
    }
}

impl LoopHandle<HeadlessContext> for Harness {
    fn start(&self) {
        self.render.start();
    }

    fn stop(&self) {
        self.render.stop();
    }

    fn switch_routine(&self, routine: Box<dyn DrawingRoutine<HeadlessContext>>) {
        self.render.switch_routine(routine);
    }

    fn is_running(&self) -> bool {
        self.render.is_running()
    }
}

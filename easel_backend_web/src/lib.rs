// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser host for easel.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafRequester`]: `requestAnimationFrame` frame requester
//! - [`WindowTimers`]: `setTimeout` debounce and settle timers
//! - [`CanvasSurface`]: `<canvas>` + `CanvasRenderingContext2d` surface
//! - [`CanvasResizer`]: `ResizeObserver`-driven resize coordination
//! - [`AnimatedCanvas`]: all of the above assembled into a [`LoopHandle`]

#![no_std]

extern crate alloc;

mod canvas;
mod raf;
mod resizer;
mod timers;

pub use canvas::CanvasSurface;
pub use easel_core::backend::LoopHandle;
pub use raf::{RafHandle, RafRequester};
pub use resizer::CanvasResizer;
pub use timers::{TimeoutHandle, WindowTimers};

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::ToString as _;
use core::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use easel_core::backend::start_when_sized;
use easel_core::render_loop::{FaultReport, LoopConfig, RenderLoop};
use easel_core::resize::ResizeConfig;
use easel_core::routine::DrawingRoutine;
use easel_core::signal::ResizeSignal;
use easel_core::trace::TraceSink;

/// The render loop type driven by an [`AnimatedCanvas`].
pub type CanvasLoop = RenderLoop<CanvasSurface, RafRequester>;

/// A canvas with a running-on-demand render loop and automatic backing
/// resolution.
///
/// Dropping it stops the loop, disconnects the resize observer, clears
/// pending timers, and releases the JS closures.
pub struct AnimatedCanvas {
    render: Rc<RefCell<CanvasLoop>>,
    requester: RafRequester,
    resizer: CanvasResizer,
}

impl core::fmt::Debug for AnimatedCanvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnimatedCanvas")
            .field("render", &self.render)
            .field("resizer", &self.resizer)
            .finish_non_exhaustive()
    }
}

impl AnimatedCanvas {
    /// Binds `canvas` and `routine` with browser-default configuration.
    ///
    /// The loop is created idle; call [`start`](LoopHandle::start) or
    /// [`start_when_sized`](Self::start_when_sized).
    ///
    /// # Errors
    ///
    /// Fails if the canvas has no 2D context or the resize observer cannot
    /// be created.
    pub fn new(
        canvas: HtmlCanvasElement,
        routine: Box<dyn DrawingRoutine<CanvasRenderingContext2d>>,
    ) -> Result<Self, JsValue> {
        Self::with_config(canvas, routine, ResizeConfig::web(), LoopConfig::web())
    }

    /// Binds `canvas` and `routine` with explicit configuration.
    ///
    /// # Errors
    ///
    /// Fails if the canvas has no 2D context or the resize observer cannot
    /// be created.
    pub fn with_config(
        canvas: HtmlCanvasElement,
        routine: Box<dyn DrawingRoutine<CanvasRenderingContext2d>>,
        resize: ResizeConfig,
        config: LoopConfig,
    ) -> Result<Self, JsValue> {
        let surface = CanvasSurface::new(canvas);
        let signal = Rc::new(ResizeSignal::new());
        let requester = RafRequester::new();

        let render = RenderLoop::new(
            surface.clone(),
            requester.clone(),
            routine,
            Rc::clone(&signal),
            config,
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let render = Rc::new(RefCell::new(render));

        let weak = Rc::downgrade(&render);
        requester.set_callback(move |timestamp_ms| {
            if let Some(render) = weak.upgrade() {
                render.borrow_mut().tick(timestamp_ms);
            }
        });

        let resizer = CanvasResizer::attach(surface, signal, resize)?;

        Ok(Self {
            render,
            requester,
            resizer,
        })
    }

    /// Starts the loop once the canvas is first laid out with a non-zero
    /// size.
    pub fn start_when_sized(&self) {
        start_when_sized(&self.render);
    }

    /// Installs a trace sink on the loop.
    ///
    /// Layout-driven resizes are traced separately, through
    /// [`CanvasResizer::set_trace_sink`] on [`resizer`](Self::resizer).
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        self.render.borrow_mut().set_trace_sink(sink);
    }

    /// Installs a callback invoked for every routine fault.
    pub fn set_fault_handler(&self, handler: impl FnMut(&FaultReport) + 'static) {
        self.render.borrow_mut().set_fault_handler(handler);
    }

    /// Most recent routine fault.
    #[must_use]
    pub fn last_fault(&self) -> Option<FaultReport> {
        self.render.borrow().last_fault().cloned()
    }

    /// The canvas element.
    #[must_use]
    pub fn canvas(&self) -> HtmlCanvasElement {
        self.render.borrow().surface().canvas().clone()
    }

    /// The resizer keeping the backing resolution current.
    #[must_use]
    pub fn resizer(&self) -> &CanvasResizer {
        &self.resizer
    }
}

impl LoopHandle<CanvasRenderingContext2d> for AnimatedCanvas {
    fn start(&self) {
        self.render.start();
    }

    fn stop(&self) {
        self.render.stop();
    }

    fn switch_routine(&self, routine: Box<dyn DrawingRoutine<CanvasRenderingContext2d>>) {
        self.render.switch_routine(routine);
    }

    fn is_running(&self) -> bool {
        self.render.is_running()
    }
}

impl Drop for AnimatedCanvas {
    fn drop(&mut self) {
        if let Ok(mut render) = self.render.try_borrow_mut() {
            render.stop();
        }
        self.requester.release();
    }
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `ResizeObserver` wiring for a [`ResizeCoordinator`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::ResizeObserver;

use easel_core::resize::{ResizeConfig, ResizeCoordinator, ResizeTimer};
use easel_core::signal::ResizeSignal;
use easel_core::surface::BackingSize;
use easel_core::trace::TraceSink;

use crate::canvas::CanvasSurface;
use crate::timers::WindowTimers;

struct ResizerState {
    coordinator: RefCell<ResizeCoordinator<CanvasSurface, WindowTimers>>,
    timers: RefCell<WindowTimers>,
}

/// Keeps a canvas's backing resolution in step with its layout box.
///
/// Observes the canvas with a `ResizeObserver` and debounces through
/// `setTimeout`. Dropping the resizer disconnects the observer and clears
/// every pending timer.
pub struct CanvasResizer {
    state: Rc<ResizerState>,
    observer: ResizeObserver,
    _on_resize: Closure<dyn FnMut(js_sys::Array)>,
}

impl core::fmt::Debug for CanvasResizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasResizer")
            .field("coordinator", &self.state.coordinator.borrow())
            .finish_non_exhaustive()
    }
}

impl CanvasResizer {
    /// Styles the canvas to fill its container, starts observing it, and
    /// performs the eager and settle recomputations.
    ///
    /// # Errors
    ///
    /// Returns the JS exception if styling the canvas or creating the
    /// observer fails.
    pub fn attach(
        surface: CanvasSurface,
        signal: Rc<ResizeSignal>,
        config: ResizeConfig,
    ) -> Result<Self, JsValue> {
        let canvas = surface.canvas().clone();
        let style = canvas.style();
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;

        let state = Rc::new(ResizerState {
            coordinator: RefCell::new(ResizeCoordinator::new(surface, signal, config)),
            timers: RefCell::new(WindowTimers::new()),
        });

        for timer in [ResizeTimer::Debounce, ResizeTimer::Settle] {
            let weak = Rc::downgrade(&state);
            state.timers.borrow_mut().set_callback(timer, move || {
                if let Some(state) = weak.upgrade() {
                    state.timers.borrow_mut().fired(timer);
                    state.coordinator.borrow_mut().timer_fired(timer);
                }
            });
        }

        let weak = Rc::downgrade(&state);
        let on_resize = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            if let Some(state) = weak.upgrade() {
                let mut timers = state.timers.borrow_mut();
                state.coordinator.borrow_mut().layout_changed(&mut timers);
            }
        }) as Box<dyn FnMut(js_sys::Array)>);

        let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref())?;
        observer.observe(&canvas);

        {
            let mut timers = state.timers.borrow_mut();
            state.coordinator.borrow_mut().attach(&mut timers);
        }

        Ok(Self {
            state,
            observer,
            _on_resize: on_resize,
        })
    }

    /// Last announced backing size.
    #[must_use]
    pub fn last_size(&self) -> BackingSize {
        self.state.coordinator.borrow().last_size()
    }

    /// Installs a trace sink for layout-driven announcements.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        self.state.coordinator.borrow_mut().set_trace_sink(sink);
    }
}

impl Drop for CanvasResizer {
    fn drop(&mut self) {
        self.observer.disconnect();
        let mut timers = self.state.timers.borrow_mut();
        self.state.coordinator.borrow_mut().detach(&mut timers);
    }
}

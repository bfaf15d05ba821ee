// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame requester.
//!
//! [`RafRequester`] implements [`FrameRequester`] on the browser's
//! `requestAnimationFrame`. Each callback receives a
//! [`DOMHighResTimeStamp`][mdn] in milliseconds, which is exactly what
//! [`RenderLoop::tick`](easel_core::render_loop::RenderLoop::tick) expects.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use easel_core::render_loop::FrameRequester;

// Direct global bindings instead of `web_sys::Window` methods: avoids
// fetching (and unwrapping) the Window object on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// Identifies an outstanding `requestAnimationFrame` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RafHandle(pub i32);

/// A [`FrameRequester`] backed by `requestAnimationFrame`.
///
/// Clones share the same JS callback. The callback is installed after the
/// loop exists (it needs a reference back to it) with
/// [`set_callback`](Self::set_callback), and released with
/// [`release`](Self::release).
#[derive(Clone, Default)]
pub struct RafRequester {
    /// The JS closure registered with every request.
    closure: Rc<RefCell<Option<RafClosure>>>,
}

impl core::fmt::Debug for RafRequester {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafRequester")
            .field("has_callback", &self.closure.borrow().is_some())
            .finish()
    }
}

impl RafRequester {
    /// Creates a requester with no callback installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the function each frame callback runs.
    pub fn set_callback(&self, callback: impl FnMut(f64) + 'static) {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(f64)>);
        *self.closure.borrow_mut() = Some(closure);
    }

    /// Drops the JS closure. Requests made afterwards are not scheduled.
    ///
    /// Cancel any outstanding request first: the browser must not call a
    /// released closure.
    pub fn release(&self) {
        self.closure.borrow_mut().take();
    }
}

impl FrameRequester for RafRequester {
    type Handle = RafHandle;

    fn request_frame(&mut self) -> RafHandle {
        match &*self.closure.borrow() {
            Some(closure) => RafHandle(request_animation_frame(closure.as_ref().unchecked_ref())),
            None => {
                log::warn!("frame requested before a callback was installed");
                RafHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: RafHandle) {
        cancel_animation_frame(handle.0);
    }
}

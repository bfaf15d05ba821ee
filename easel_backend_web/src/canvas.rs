// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<canvas>` surface.

use easel_core::surface::{BackingSize, Surface};
use kurbo::Size;
use wasm_bindgen::JsCast as _;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// A [`Surface`] over an `HTMLCanvasElement` and its 2D context.
///
/// The display box is the element's bounding client rect, the density ratio
/// is `window.devicePixelRatio`, and the backing size is the canvas's
/// `width`/`height` attributes. Clones refer to the same element.
#[derive(Clone, Debug)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    /// Wraps `canvas`.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    /// The canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    type Context = CanvasRenderingContext2d;

    fn context(&self) -> Option<CanvasRenderingContext2d> {
        self.canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()
    }

    fn display_box(&self) -> Size {
        let rect = self.canvas.get_bounding_client_rect();
        Size::new(rect.width(), rect.height())
    }

    fn density_ratio(&self) -> f64 {
        // A missing window reads as 0 and falls back to 1.
        web_sys::window().map_or(0.0, |w| w.device_pixel_ratio())
    }

    fn backing_size(&self) -> BackingSize {
        BackingSize::new(self.canvas.width(), self.canvas.height())
    }

    fn set_backing_size(&self, size: BackingSize) {
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    fn clear(&self, context: &CanvasRenderingContext2d, size: BackingSize) {
        context.clear_rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
    }
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web example: a resize-aware `<canvas>` driven by `easel_backend_web`.
//!
//! Appends a full-size canvas to `#root` (or the body) and a button that
//! hot-swaps between three drawing routines without stopping the loop.
//! Resize the window or move it to a display with a different pixel ratio to
//! watch the backing resolution follow.
//!
//! Build with: `wasm-pack build --target web demos/web_canvas`
//!
//! Then serve `demos/web_canvas/` and open `index.html` in a browser.

// This crate only runs in the browser; suppress dead-code warnings when
// cargo-checking on a native host target.
#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod routines;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Element, HtmlButtonElement, HtmlCanvasElement};

use easel_backend_web::{AnimatedCanvas, LoopHandle as _};
use easel_core::routine::DrawingRoutine;

use crate::routines::{HelloCanvas, ResizeTest, RotatingRect};

const ROUTINE_NAMES: [&str; 3] = ["Hello", "Resize", "Rect"];

fn routine_at(index: usize) -> Box<dyn DrawingRoutine<CanvasRenderingContext2d>> {
    match index % ROUTINE_NAMES.len() {
        0 => Box::new(HelloCanvas::default()),
        1 => Box::new(ResizeTest::default()),
        _ => Box::new(RotatingRect::default()),
    }
}

fn switch_label(index: usize) -> String {
    format!("Switch to {}", ROUTINE_NAMES[index % ROUTINE_NAMES.len()])
}

/// Entry point, called automatically by `wasm_bindgen(start)`.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no global window")?;
    let document = window.document().ok_or("no document")?;
    let root: Element = match document.get_element_by_id("root") {
        Some(root) => root,
        None => document.body().ok_or("no body")?.into(),
    };

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.unchecked_into();
    canvas.style().set_property("display", "block")?;
    root.append_child(&canvas)?;

    let animated = Rc::new(AnimatedCanvas::new(canvas, routine_at(0))?);
    animated.set_fault_handler(|report| {
        log::error!("frame {}: {}", report.frame_index, report.error);
    });
    animated.start_when_sized();

    let button: HtmlButtonElement = document.create_element("button")?.unchecked_into();
    button.set_text_content(Some(&switch_label(1)));
    let style = button.style();
    style.set_property("position", "fixed")?;
    style.set_property("top", "10px")?;
    style.set_property("left", "10px")?;
    style.set_property("z-index", "1000")?;
    style.set_property("padding", "8px 12px")?;

    let on_click = {
        let animated = Rc::clone(&animated);
        let button = button.clone();
        let mut current = 0;
        Closure::wrap(Box::new(move || {
            current = (current + 1) % ROUTINE_NAMES.len();
            animated.switch_routine(routine_at(current));
            button.set_text_content(Some(&switch_label(current + 1)));
        }) as Box<dyn FnMut()>)
    };
    button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
    root.append_child(&button)?;

    // The page owns the canvas until unload; there is no graceful shutdown.
    on_click.forget();

    Ok(())
}

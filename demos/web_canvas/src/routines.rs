// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The three drawing routines the demo cycles through.
//!
//! Each keeps its size-dependent layout behind an `Rc<RefCell<_>>` shared
//! with a resize listener. The listener holds a weak reference: a switched-out
//! routine is dropped before the loop's re-announcement reaches its listener,
//! and the loop unsubscribes that listener right after.

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::f64::consts::TAU;

use kurbo::Point;
use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

use easel_core::error::RoutineError;
use easel_core::routine::{DrawingRoutine, Frame};
use easel_core::surface::ResizeAnnouncement;

type Ctx = CanvasRenderingContext2d;

fn js_fault(err: JsValue) -> RoutineError {
    RoutineError::new(format!("canvas call failed: {err:?}"))
}

/// Runs `relayout` on every announcement while `layout` is alive.
fn follow_resize<T: 'static>(
    frame: &Frame<'_, Ctx>,
    layout: &Rc<RefCell<T>>,
    mut relayout: impl FnMut(&mut T, &ResizeAnnouncement) + 'static,
) {
    let weak = Rc::downgrade(layout);
    frame.resize.subscribe(move |announcement| {
        if let Some(layout) = weak.upgrade() {
            relayout(&mut layout.borrow_mut(), announcement);
        }
    });
}

// ---------------------------------------------------------------------------
// HelloCanvas
// ---------------------------------------------------------------------------

#[derive(Default)]
struct HelloLayout {
    gradient: Option<CanvasGradient>,
    center: Point,
    font_px: f64,
}

impl HelloLayout {
    fn compute(ctx: &Ctx, width: f64, height: f64) -> Result<Self, JsValue> {
        let gradient = ctx.create_linear_gradient(0.0, 0.0, width, height);
        gradient.add_color_stop(0.0, "#ff6b6b")?;
        gradient.add_color_stop(1.0, "#4ecdc4")?;
        Ok(Self {
            gradient: Some(gradient),
            center: Point::new(width / 2.0, height / 2.0),
            font_px: (height / 8.0).max(16.0),
        })
    }
}

/// A diagonal gradient card with centered greeting text.
#[derive(Default)]
pub(crate) struct HelloCanvas {
    layout: Rc<RefCell<HelloLayout>>,
}

impl DrawingRoutine<Ctx> for HelloCanvas {
    fn initialize(&mut self, frame: &Frame<'_, Ctx>) -> Result<(), RoutineError> {
        let size = frame.size();
        *self.layout.borrow_mut() =
            HelloLayout::compute(frame.context, f64::from(size.width), f64::from(size.height))
                .map_err(js_fault)?;

        let ctx = frame.context.clone();
        follow_resize(frame, &self.layout, move |layout, announcement| {
            match HelloLayout::compute(
                &ctx,
                f64::from(announcement.width),
                f64::from(announcement.height),
            ) {
                Ok(next) => *layout = next,
                Err(err) => log::warn!("gradient relayout failed: {err:?}"),
            }
        });
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Frame<'_, Ctx>) -> Result<(), RoutineError> {
        let ctx = frame.context;
        let layout = self.layout.borrow();

        if let Some(gradient) = &layout.gradient {
            ctx.set_fill_style_canvas_gradient(gradient);
        }
        ctx.fill_rect(0.0, 0.0, f64::from(frame.width), f64::from(frame.height));

        ctx.set_fill_style_str("white");
        ctx.set_font(&format!("{:.0}px sans-serif", layout.font_px));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text("Hello Canvas!", layout.center.x, layout.center.y)
            .map_err(js_fault)
    }
}

// ---------------------------------------------------------------------------
// ResizeTest
// ---------------------------------------------------------------------------

const GRID: f64 = 50.0;
const MARKER_INSET: f64 = 10.0;

const INSTRUCTIONS: [&str; 5] = [
    "Resize Test Pattern",
    "Red dots should stay at corners and edges",
    "Blue crosshair should stay centered",
    "Grid should fill the entire canvas",
    "Dimensions should update on resize",
];

#[derive(Default)]
struct TestLayout {
    markers: Vec<Point>,
    density_ratio: f64,
}

impl TestLayout {
    fn compute(width: f64, height: f64, density_ratio: f64) -> Self {
        let (l, t) = (MARKER_INSET, MARKER_INSET);
        let (r, b) = (width - MARKER_INSET, height - MARKER_INSET);
        let (cx, cy) = (width / 2.0, height / 2.0);
        Self {
            markers: [(l, t), (r, t), (l, b), (r, b), (cx, t), (cx, b), (l, cy), (r, cy)]
                .into_iter()
                .map(Point::from)
                .collect(),
            density_ratio,
        }
    }
}

/// A calibration pattern: grid, edge markers, crosshair, and the current
/// backing size. Any stretching or cropping shows immediately.
#[derive(Default)]
pub(crate) struct ResizeTest {
    layout: Rc<RefCell<TestLayout>>,
}

impl ResizeTest {
    fn draw_grid(ctx: &Ctx, width: f64, height: f64) -> Result<(), JsValue> {
        ctx.set_stroke_style_str("#ddd");
        ctx.set_line_width(1.0);
        let mut x = 0.0;
        while x <= width {
            ctx.begin_path();
            ctx.move_to(x, 0.0);
            ctx.line_to(x, height);
            ctx.stroke();
            x += GRID;
        }
        let mut y = 0.0;
        while y <= height {
            ctx.begin_path();
            ctx.move_to(0.0, y);
            ctx.line_to(width, y);
            ctx.stroke();
            y += GRID;
        }

        ctx.set_fill_style_str("#999");
        ctx.set_font("14px sans-serif");
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        let mut x = 0.0;
        while x <= width {
            let mut y = 0.0;
            while y <= height {
                ctx.fill_text(&format!("{x:.0},{y:.0}"), x + 2.0, y + 2.0)?;
                y += GRID * 2.0;
            }
            x += GRID * 2.0;
        }
        Ok(())
    }

    fn draw_crosshair(ctx: &Ctx, width: f64, height: f64) -> Result<(), JsValue> {
        let (cx, cy) = (width / 2.0, height / 2.0);
        ctx.set_stroke_style_str("blue");
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(0.0, cy);
        ctx.line_to(width, cy);
        ctx.move_to(cx, 0.0);
        ctx.line_to(cx, height);
        ctx.stroke();
        ctx.begin_path();
        ctx.arc(cx, cy, 10.0, 0.0, TAU)?;
        ctx.stroke();
        Ok(())
    }

    fn draw(&self, frame: &Frame<'_, Ctx>) -> Result<(), JsValue> {
        let ctx = frame.context;
        let (width, height) = (f64::from(frame.width), f64::from(frame.height));
        let layout = self.layout.borrow();

        ctx.set_fill_style_str("#f0f0f0");
        ctx.fill_rect(0.0, 0.0, width, height);
        Self::draw_grid(ctx, width, height)?;

        ctx.set_stroke_style_str("#333");
        ctx.set_line_width(2.0);
        ctx.stroke_rect(0.0, 0.0, width, height);

        ctx.set_fill_style_str("red");
        for marker in &layout.markers {
            ctx.begin_path();
            ctx.arc(marker.x, marker.y, 5.0, 0.0, TAU)?;
            ctx.fill();
        }

        ctx.set_fill_style_str("#333");
        ctx.set_font("20px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let dims = format!("{} \u{d7} {}", frame.width, frame.height);
        ctx.fill_text(&dims, width / 2.0, height / 2.0 - 20.0)?;
        ctx.set_font("14px sans-serif");
        let density = format!("Device pixel ratio: {}", layout.density_ratio);
        ctx.fill_text(&density, width / 2.0, height / 2.0 + 20.0)?;

        Self::draw_crosshair(ctx, width, height)?;

        ctx.set_fill_style_str("#666");
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        for (line, text) in (0_u8..).zip(INSTRUCTIONS) {
            ctx.fill_text(text, 10.0, 30.0 + f64::from(line) * 20.0)?;
        }
        ctx.set_text_align("right");
        ctx.set_text_baseline("bottom");
        ctx.fill_text("Look for stretching or cropping", width - 10.0, height - 10.0)
    }
}

impl DrawingRoutine<Ctx> for ResizeTest {
    fn initialize(&mut self, frame: &Frame<'_, Ctx>) -> Result<(), RoutineError> {
        // The density arrives with the first announcement.
        *self.layout.borrow_mut() =
            TestLayout::compute(f64::from(frame.width), f64::from(frame.height), 1.0);
        follow_resize(frame, &self.layout, |layout, announcement| {
            *layout = TestLayout::compute(
                f64::from(announcement.width),
                f64::from(announcement.height),
                announcement.density_ratio,
            );
        });
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Frame<'_, Ctx>) -> Result<(), RoutineError> {
        self.draw(frame).map_err(js_fault)
    }
}

// ---------------------------------------------------------------------------
// RotatingRect
// ---------------------------------------------------------------------------

/// Radians per second.
const SPIN_RATE: f64 = 0.3;
/// Hue degrees per second.
const HUE_RATE: f64 = 60.0;

#[derive(Default)]
struct SpinLayout {
    center: Point,
    side: f64,
}

impl SpinLayout {
    fn compute(width: f64, height: f64) -> Self {
        Self {
            center: Point::new(width / 2.0, height / 2.0),
            side: width.min(height) * 0.5,
        }
    }
}

/// A square spinning about the canvas center while cycling through hues.
#[derive(Default)]
pub(crate) struct RotatingRect {
    layout: Rc<RefCell<SpinLayout>>,
    rotation: f64,
    hue: f64,
}

impl RotatingRect {
    fn draw_square(&self, ctx: &Ctx) -> Result<(), JsValue> {
        let layout = self.layout.borrow();
        let half = layout.side / 2.0;
        ctx.translate(layout.center.x, layout.center.y)?;
        ctx.rotate(self.rotation)?;
        ctx.set_fill_style_str(&format!("hsl({:.0}, 70%, 60%)", self.hue));
        ctx.fill_rect(-half, -half, layout.side, layout.side);
        ctx.set_stroke_style_str("white");
        ctx.set_line_width(3.0);
        ctx.stroke_rect(-half, -half, layout.side, layout.side);
        Ok(())
    }
}

impl DrawingRoutine<Ctx> for RotatingRect {
    fn initialize(&mut self, frame: &Frame<'_, Ctx>) -> Result<(), RoutineError> {
        *self.layout.borrow_mut() =
            SpinLayout::compute(f64::from(frame.width), f64::from(frame.height));
        follow_resize(frame, &self.layout, |layout, announcement| {
            *layout = SpinLayout::compute(
                f64::from(announcement.width),
                f64::from(announcement.height),
            );
        });
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Frame<'_, Ctx>) -> Result<(), RoutineError> {
        let ctx = frame.context;
        self.rotation = (self.rotation + SPIN_RATE * frame.delta_elapsed) % TAU;
        self.hue = (self.hue + HUE_RATE * frame.delta_elapsed) % 360.0;

        ctx.set_fill_style_str("rgba(0, 0, 0, 0.1)");
        ctx.fill_rect(0.0, 0.0, f64::from(frame.width), f64::from(frame.height));

        ctx.save();
        let drawn = self.draw_square(ctx);
        ctx.restore();
        drawn.map_err(js_fault)
    }
}

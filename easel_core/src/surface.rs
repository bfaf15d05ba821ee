// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing-surface contract and backing-resolution arithmetic.
//!
//! A surface has two sizes: its on-screen *display box* in logical pixels,
//! and its *backing resolution*, the pixel dimensions of the bitmap that is
//! actually drawn into. The [`ResizeCoordinator`](crate::resize::ResizeCoordinator)
//! keeps the latter in step with the former times the display's density
//! ratio.

use alloc::rc::Rc;

use kurbo::Size;

/// Backing resolution of a surface, in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BackingSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl BackingSize {
    /// A surface that has not been sized yet.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Creates a backing size.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Payload of a resize notification.
///
/// Emitted by the coordinator only when the computed backing resolution
/// differs from the previously emitted one, and synthesized by
/// [`RenderLoop::switch_routine`](crate::render_loop::RenderLoop::switch_routine)
/// so a newly activated routine learns the current size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeAnnouncement {
    /// Backing width in device pixels.
    pub width: u32,
    /// Backing height in device pixels.
    pub height: u32,
    /// Device pixels per logical pixel.
    pub density_ratio: f64,
}

impl ResizeAnnouncement {
    /// Creates an announcement for `size` at `density_ratio`.
    #[inline]
    #[must_use]
    pub const fn new(size: BackingSize, density_ratio: f64) -> Self {
        Self {
            width: size.width,
            height: size.height,
            density_ratio,
        }
    }

    /// Returns the announced backing size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> BackingSize {
        BackingSize::new(self.width, self.height)
    }
}

/// A display surface the render loop draws into.
///
/// Methods take `&self`: surfaces are shared handles (a DOM element, a
/// window) observed by the resize coordinator and read by the render loop
/// from the same thread.
pub trait Surface {
    /// The drawing context handed to routines each frame.
    type Context;

    /// Acquires the drawing context, or `None` if the surface cannot provide
    /// one.
    fn context(&self) -> Option<Self::Context>;

    /// Current on-screen box, in logical pixels.
    fn display_box(&self) -> Size;

    /// Current device pixels per logical pixel.
    fn density_ratio(&self) -> f64;

    /// Current backing resolution.
    fn backing_size(&self) -> BackingSize;

    /// Replaces the backing resolution.
    fn set_backing_size(&self, size: BackingSize);

    /// Clears the drawing area before a frame is drawn.
    fn clear(&self, context: &Self::Context, size: BackingSize);
}

impl<S: Surface + ?Sized> Surface for Rc<S> {
    type Context = S::Context;

    fn context(&self) -> Option<Self::Context> {
        (**self).context()
    }

    fn display_box(&self) -> Size {
        (**self).display_box()
    }

    fn density_ratio(&self) -> f64 {
        (**self).density_ratio()
    }

    fn backing_size(&self) -> BackingSize {
        (**self).backing_size()
    }

    fn set_backing_size(&self, size: BackingSize) {
        (**self).set_backing_size(size);
    }

    fn clear(&self, context: &Self::Context, size: BackingSize) {
        (**self).clear(context, size);
    }
}

/// Normalizes a reported density ratio: anything non-finite or non-positive
/// falls back to `1.0`.
#[inline]
#[must_use]
pub fn effective_density(density_ratio: f64) -> f64 {
    if density_ratio.is_finite() && density_ratio > 0.0 {
        density_ratio
    } else {
        1.0
    }
}

/// Computes the backing resolution for a display box at a density ratio.
///
/// Each dimension is `floor(dimension * density)`. Returns `None` when
/// either result is non-positive: the surface is not laid out yet.
#[must_use]
pub fn backing_size_for(display_box: Size, density_ratio: f64) -> Option<BackingSize> {
    let density = effective_density(density_ratio);
    let width = scaled_dimension(display_box.width, density)?;
    let height = scaled_dimension(display_box.height, density)?;
    Some(BackingSize { width, height })
}

fn scaled_dimension(logical: f64, density: f64) -> Option<u32> {
    let device = logical * density;
    if device.is_nan() || device < 1.0 {
        return None;
    }
    // Truncation toward zero is floor for positive values.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "device is >= 1; truncation is the intended floor and oversized boxes saturate"
    )]
    let px = device as u32;
    Some(px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_scaled_dimensions() {
        let size = backing_size_for(Size::new(100.7, 50.2), 2.0).unwrap();
        assert_eq!(size, BackingSize::new(201, 100));

        let size = backing_size_for(Size::new(333.0, 333.0), 1.5).unwrap();
        assert_eq!(size, BackingSize::new(499, 499));
    }

    #[test]
    fn unlaid_out_box_is_not_ready() {
        assert_eq!(backing_size_for(Size::ZERO, 2.0), None);
        assert_eq!(backing_size_for(Size::new(300.0, 0.0), 1.0), None);
        assert_eq!(backing_size_for(Size::new(-5.0, 10.0), 1.0), None);
        // Rounds down to zero.
        assert_eq!(backing_size_for(Size::new(0.4, 10.0), 2.0), None);
    }

    #[test]
    fn bad_density_falls_back_to_one() {
        assert_eq!(effective_density(0.0), 1.0);
        assert_eq!(effective_density(-2.0), 1.0);
        assert_eq!(effective_density(f64::NAN), 1.0);
        assert_eq!(effective_density(f64::INFINITY), 1.0);
        assert_eq!(effective_density(2.5), 2.5);

        let size = backing_size_for(Size::new(64.0, 32.0), f64::NAN).unwrap();
        assert_eq!(size, BackingSize::new(64, 32));
    }

    #[test]
    fn announcement_round_trips_size() {
        let a = ResizeAnnouncement::new(BackingSize::new(300, 200), 2.0);
        assert_eq!(a.size(), BackingSize::new(300, 200));
        assert_eq!(a.density_ratio, 2.0);
    }

    #[test]
    fn empty_sizes() {
        assert!(BackingSize::ZERO.is_empty());
        assert!(BackingSize::new(10, 0).is_empty());
        assert!(!BackingSize::new(1, 1).is_empty());
    }
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory surface.

use core::cell::Cell;

use easel_core::surface::{BackingSize, Surface};
use kurbo::Size;

/// Drawing context of a [`HeadlessSurface`].
///
/// Carries no drawing state; routines under test record what they need
/// themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeadlessContext;

/// A surface whose display box and density ratio are set by the test.
#[derive(Debug)]
pub struct HeadlessSurface {
    display: Cell<Size>,
    density: Cell<f64>,
    backing: Cell<BackingSize>,
    has_context: bool,
    clears: Cell<u64>,
    backing_writes: Cell<u64>,
}

impl HeadlessSurface {
    /// Creates a surface with the given display box (logical pixels) and
    /// density ratio. The backing size starts at `0×0`.
    #[must_use]
    pub fn new(display: Size, density_ratio: f64) -> Self {
        Self {
            display: Cell::new(display),
            density: Cell::new(density_ratio),
            backing: Cell::new(BackingSize::ZERO),
            has_context: true,
            clears: Cell::new(0),
            backing_writes: Cell::new(0),
        }
    }

    /// A surface that cannot provide a drawing context.
    #[must_use]
    pub fn without_context(display: Size, density_ratio: f64) -> Self {
        Self {
            has_context: false,
            ..Self::new(display, density_ratio)
        }
    }

    /// Changes the display box. Does not notify anyone.
    pub fn set_display_box(&self, display: Size) {
        self.display.set(display);
    }

    /// Changes the density ratio. Does not notify anyone.
    pub fn set_density_ratio(&self, density_ratio: f64) {
        self.density.set(density_ratio);
    }

    /// Number of full-area clears performed.
    #[must_use]
    pub fn clear_count(&self) -> u64 {
        self.clears.get()
    }

    /// Number of backing-size writes.
    #[must_use]
    pub fn backing_writes(&self) -> u64 {
        self.backing_writes.get()
    }
}

impl Surface for HeadlessSurface {
    type Context = HeadlessContext;

    fn context(&self) -> Option<HeadlessContext> {
        self.has_context.then_some(HeadlessContext)
    }

    fn display_box(&self) -> Size {
        self.display.get()
    }

    fn density_ratio(&self) -> f64 {
        self.density.get()
    }

    fn backing_size(&self) -> BackingSize {
        self.backing.get()
    }

    fn set_backing_size(&self, size: BackingSize) {
        self.backing.set(size);
        self.backing_writes.set(self.backing_writes.get() + 1);
    }

    fn clear(&self, _context: &HeadlessContext, _size: BackingSize) {
        self.clears.set(self.clears.get() + 1);
    }
}

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! Easel splits platform-specific work into *host* crates. Each host
//! provides the following pieces:
//!
//! - **Surface**: Implements [`Surface`] for a platform drawing target
//!   (e.g. an `HTMLCanvasElement` and its 2D context). The surface reports
//!   its display box and density ratio and accepts a new backing size.
//!
//! - **Frame source**: Implements [`FrameRequester`] on top of the
//!   platform's per-frame callback (e.g. `requestAnimationFrame`) and routes
//!   each callback to [`RenderLoop::tick`] with a millisecond timestamp.
//!
//! - **Timers**: Implements [`TimerHost`] with the platform's timeout
//!   primitive and routes firings to [`ResizeCoordinator::timer_fired`].
//!
//! - **Layout observation**: Calls [`ResizeCoordinator::layout_changed`]
//!   whenever the surface's display box may have changed. This is
//!   host-specific and not abstracted by a trait because the observer APIs
//!   differ fundamentally across platforms.
//!
//! - **Handle**: Implements [`LoopHandle`] so application code can drive
//!   the loop without knowing how the host shares it with its callbacks.
//!
//! # Crate boundaries
//!
//! `easel_core` owns timing, sizing arithmetic, the resize signal, and the
//! loop state machine. Host crates depend on `easel_core` and provide
//! platform glue. Application code depends on both and supplies drawing
//! routines.
//!
//! [`Surface`]: crate::surface::Surface
//! [`FrameRequester`]: crate::render_loop::FrameRequester
//! [`RenderLoop::tick`]: crate::render_loop::RenderLoop::tick
//! [`TimerHost`]: crate::resize::TimerHost
//! [`ResizeCoordinator::timer_fired`]: crate::resize::ResizeCoordinator::timer_fired
//! [`ResizeCoordinator::layout_changed`]: crate::resize::ResizeCoordinator::layout_changed

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use crate::render_loop::{FrameRequester, RenderLoop};
use crate::routine::DrawingRoutine;
use crate::surface::{Surface, backing_size_for};

/// Application-facing control of a hosted render loop.
///
/// Hosts share the loop with their platform callbacks, so the methods take
/// `&self`.
///
/// # Wiring pseudocode
///
/// ```rust,ignore
/// let canvas = AnimatedCanvas::new(element, Box::new(HelloCanvas::default()))?;
/// canvas.start_when_sized();
///
/// button.on_click(move || {
///     canvas.switch_routine(Box::new(RotatingRect::default()));
/// });
/// ```
pub trait LoopHandle<C> {
    /// Starts (or restarts) the loop.
    fn start(&self);

    /// Stops the loop; no further frames are drawn until the next start.
    fn stop(&self);

    /// Replaces the active drawing routine without stopping the loop.
    fn switch_routine(&self, routine: Box<dyn DrawingRoutine<C>>);

    /// Returns `true` while frames are scheduled.
    fn is_running(&self) -> bool;
}

/// A loop shared between application code and host callbacks.
impl<S: Surface, R: FrameRequester> LoopHandle<S::Context> for RefCell<RenderLoop<S, R>> {
    fn start(&self) {
        self.borrow_mut().start();
    }

    fn stop(&self) {
        self.borrow_mut().stop();
    }

    fn switch_routine(&self, routine: Box<dyn DrawingRoutine<S::Context>>) {
        self.borrow_mut().switch_routine(routine);
    }

    fn is_running(&self) -> bool {
        self.borrow().is_running()
    }
}

/// Starts `shared` once its surface is laid out with a non-empty size.
///
/// Readiness comes from the display box, not the current backing size: a
/// fresh canvas bitmap has a default size before any layout. If the surface
/// is already laid out the loop starts immediately. Otherwise a
/// one-shot listener on the loop's resize signal starts it on the first
/// non-empty announcement and then unsubscribes. The listener holds only weak
/// references, so it never keeps the loop alive.
///
/// An announcement delivered while the loop is already borrowed (the
/// synthetic one from `switch_routine`) is skipped; the listener stays
/// subscribed for the next one.
///
/// # Panics
///
/// Panics if `shared` is mutably borrowed when this is called.
pub fn start_when_sized<S, R>(shared: &Rc<RefCell<RenderLoop<S, R>>>)
where
    S: Surface + 'static,
    R: FrameRequester + 'static,
{
    let signal = {
        let mut lp = shared.borrow_mut();
        let surface = lp.surface();
        if backing_size_for(surface.display_box(), surface.density_ratio()).is_some() {
            if !lp.is_running() {
                lp.start();
            }
            return;
        }
        Rc::clone(lp.signal())
    };

    let target = Rc::downgrade(shared);
    let weak_signal = Rc::downgrade(&signal);
    let own_id = Rc::new(Cell::new(None));
    let id_slot = Rc::clone(&own_id);

    let id = signal.subscribe(move |announcement| {
        if announcement.size().is_empty() {
            return;
        }
        if let Some(shared) = target.upgrade() {
            let Ok(mut lp) = shared.try_borrow_mut() else {
                log::trace!("loop busy; waiting for the next announcement to start");
                return;
            };
            if !lp.is_running() {
                log::debug!(
                    "surface sized to {}x{}; starting render loop",
                    announcement.width,
                    announcement.height
                );
                lp.start();
            }
        }
        if let (Some(signal), Some(id)) = (weak_signal.upgrade(), id_slot.get()) {
            signal.unsubscribe(id);
        }
    });
    own_id.set(Some(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoutineError;
    use crate::render_loop::LoopConfig;
    use crate::routine::Frame;
    use crate::signal::ResizeSignal;
    use crate::surface::{BackingSize, ResizeAnnouncement};
    use kurbo::Size;

    #[derive(Default)]
    struct Canvas {
        display: Cell<Size>,
        backing: Cell<BackingSize>,
    }

    impl Surface for Canvas {
        type Context = ();

        fn context(&self) -> Option<()> {
            Some(())
        }

        fn display_box(&self) -> Size {
            self.display.get()
        }

        fn density_ratio(&self) -> f64 {
            1.0
        }

        fn backing_size(&self) -> BackingSize {
            self.backing.get()
        }

        fn set_backing_size(&self, size: BackingSize) {
            self.backing.set(size);
        }

        fn clear(&self, _: &(), _: BackingSize) {}
    }

    #[derive(Default)]
    struct Frames(u32);

    impl FrameRequester for Frames {
        type Handle = u32;

        fn request_frame(&mut self) -> u32 {
            self.0 += 1;
            self.0
        }

        fn cancel_frame(&mut self, _: u32) {}
    }

    struct Idle;

    impl DrawingRoutine<()> for Idle {
        fn initialize(&mut self, _: &Frame<'_, ()>) -> Result<(), RoutineError> {
            Ok(())
        }

        fn draw_frame(&mut self, _: &Frame<'_, ()>) -> Result<(), RoutineError> {
            Ok(())
        }
    }

    fn shared() -> Rc<RefCell<RenderLoop<Rc<Canvas>, Frames>>> {
        let lp = RenderLoop::new(
            Rc::new(Canvas::default()),
            Frames::default(),
            Box::new(Idle),
            Rc::new(ResizeSignal::new()),
            LoopConfig::web(),
        )
        .unwrap();
        Rc::new(RefCell::new(lp))
    }

    fn announce(shared: &Rc<RefCell<RenderLoop<Rc<Canvas>, Frames>>>, w: u32, h: u32) {
        let signal = Rc::clone(shared.borrow().signal());
        shared.borrow().surface().set_backing_size(BackingSize::new(w, h));
        signal.emit(&ResizeAnnouncement::new(BackingSize::new(w, h), 1.0));
    }

    #[test]
    fn starts_on_first_non_empty_announcement() {
        let lp = shared();
        start_when_sized(&lp);
        assert!(!lp.is_running());
        assert_eq!(lp.borrow().signal().listener_count(), 1);

        announce(&lp, 0, 0);
        assert!(!lp.is_running(), "empty announcement ignored");

        announce(&lp, 300, 150);
        assert!(lp.is_running());
        assert_eq!(lp.borrow().signal().listener_count(), 0, "one-shot");
    }

    #[test]
    fn already_laid_out_starts_immediately() {
        let lp = shared();
        lp.borrow().surface().display.set(Size::new(10.0, 10.0));
        start_when_sized(&lp);
        assert!(lp.is_running());
        assert_eq!(lp.borrow().signal().listener_count(), 0);
    }

    #[test]
    fn default_bitmap_without_layout_waits() {
        let lp = shared();
        // A canvas bitmap is 300x150 before layout.
        lp.borrow().surface().set_backing_size(BackingSize::new(300, 150));
        start_when_sized(&lp);
        assert!(!lp.is_running(), "display box is still empty");
        assert_eq!(lp.borrow().signal().listener_count(), 1);

        lp.borrow().surface().display.set(Size::new(320.0, 240.0));
        announce(&lp, 320, 240);
        assert!(lp.is_running());
    }

    #[test]
    fn switch_during_wait_does_not_panic() {
        let lp = shared();
        start_when_sized(&lp);
        lp.borrow().surface().set_backing_size(BackingSize::new(8, 8));
        // The synthetic announcement arrives while the loop is borrowed.
        lp.switch_routine(Box::new(Idle));
        assert!(!lp.is_running());
        assert_eq!(lp.borrow().signal().listener_count(), 1, "still waiting");

        announce(&lp, 16, 16);
        assert!(lp.is_running());
    }

    #[test]
    fn handle_drives_shared_loop() {
        let lp = shared();
        lp.start();
        assert!(lp.is_running());
        lp.stop();
        assert!(!lp.is_running());
    }
}

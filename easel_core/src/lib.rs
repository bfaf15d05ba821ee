// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resize-aware render loop for a single 2D drawing surface.
//!
//! `easel_core` owns surface sizing, frame-time accounting, and the
//! running/stopped lifecycle of a pluggable [`DrawingRoutine`]. It is
//! `no_std` compatible (with `alloc`) and never talks to a platform
//! directly: hosts supply the per-frame scheduling primitive
//! ([`FrameRequester`]), a timeout primitive ([`TimerHost`]), and the
//! surface itself ([`Surface`]).
//!
//! # Architecture
//!
//! ```text
//!   host layout observer ──► ResizeCoordinator ──(debounce)──► recompute()
//!                                                                  │
//!                              set_backing_size() ◄────────────────┤
//!                                                                  ▼
//!   DrawingRoutine ◄──subscribe── ResizeSignal ◄──emit── ResizeAnnouncement
//!         ▲
//!         │ draw_frame(&Frame)
//!   RenderLoop::tick(timestamp) ◄── host frame callback ◄── FrameRequester
//!         │
//!         └──► compute_frame_time() (Frame Clock)
//! ```
//!
//! **[`clock`]**: Pure Frame Clock turning raw timestamps into
//! delta/total elapsed seconds.
//!
//! **[`surface`]**: The [`Surface`] host contract, [`BackingSize`], and
//! density-aware backing-size computation.
//!
//! **[`signal`]**: [`ResizeSignal`], the typed observer that carries
//! [`ResizeAnnouncement`]s to drawing routines.
//!
//! **[`resize`]**: [`ResizeCoordinator`], debounced, edge-triggered
//! backing-resolution synchronization.
//!
//! **[`render_loop`]**: [`RenderLoop`], the scheduled per-frame callback,
//! start/stop lifecycle, and routine hot-swapping.
//!
//! **[`routine`]**: The [`DrawingRoutine`] contract and the per-tick
//! [`Frame`] snapshot.
//!
//! **[`backend`]**: The [`LoopHandle`] contract that hosts expose to
//! callers, [`start_when_sized`](backend::start_when_sized), and an overview
//! of what a host must provide.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! render-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//!
//! [`DrawingRoutine`]: routine::DrawingRoutine
//! [`Frame`]: routine::Frame
//! [`FrameRequester`]: render_loop::FrameRequester
//! [`RenderLoop`]: render_loop::RenderLoop
//! [`TimerHost`]: resize::TimerHost
//! [`ResizeCoordinator`]: resize::ResizeCoordinator
//! [`Surface`]: surface::Surface
//! [`BackingSize`]: surface::BackingSize
//! [`ResizeAnnouncement`]: surface::ResizeAnnouncement
//! [`ResizeSignal`]: signal::ResizeSignal
//! [`LoopHandle`]: backend::LoopHandle

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod clock;
pub mod error;
pub mod render_loop;
pub mod resize;
pub mod routine;
pub mod signal;
pub mod surface;
pub mod trace;

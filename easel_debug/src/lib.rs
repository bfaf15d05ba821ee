// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and Chrome trace export for easel diagnostics.
//!
//! This crate provides [`TraceSink`](easel_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`chrome::ChromeTraceSink`]: collects events and writes Chrome Trace
//!   Event Format JSON.
//!
//! Sinks are handed to the loop by value. To read one back after a run, share
//! it as `Rc<RefCell<_>>`, which also implements `TraceSink`.

pub mod chrome;
pub mod pretty;

// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Manually pumped frame requester.

use alloc::vec::Vec;

use easel_core::render_loop::FrameRequester;

/// Identifies one frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

/// A [`FrameRequester`] whose requests fire only when the test says so.
#[derive(Debug, Default)]
pub struct ManualFrames {
    next: u64,
    outstanding: Vec<FrameId>,
    requested: u64,
    cancelled: u64,
}

impl ManualFrames {
    /// Creates a requester with nothing outstanding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests that have neither fired nor been cancelled.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Total requests made.
    #[must_use]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total requests cancelled while outstanding.
    #[must_use]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Fires the oldest outstanding request, if any.
    pub fn fire(&mut self) -> Option<FrameId> {
        if self.outstanding.is_empty() {
            None
        } else {
            Some(self.outstanding.remove(0))
        }
    }
}

impl FrameRequester for ManualFrames {
    type Handle = FrameId;

    fn request_frame(&mut self) -> FrameId {
        self.next += 1;
        self.requested += 1;
        let id = FrameId(self.next);
        self.outstanding.push(id);
        id
    }

    fn cancel_frame(&mut self, handle: FrameId) {
        let before = self.outstanding.len();
        self.outstanding.retain(|&id| id != handle);
        if self.outstanding.len() != before {
            self.cancelled += 1;
        }
    }
}

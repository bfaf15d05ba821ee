// Copyright 2026 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only two things can go wrong: a surface without a drawing context at
//! construction ([`LoopError`]), and a drawing routine reporting a fault
//! ([`RoutineError`]). Surfaces that are not laid out yet are not errors;
//! the resize coordinator simply tries again later.

use alloc::borrow::Cow;

/// Construction failure of a [`RenderLoop`](crate::render_loop::RenderLoop).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoopError {
    /// The surface cannot provide a drawing context.
    #[error("surface does not provide a drawing context")]
    ContextUnavailable,
}

/// A fault reported by a drawing routine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RoutineError {
    message: Cow<'static, str>,
}

impl RoutineError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&'static str> for RoutineError {
    fn from(message: &'static str) -> Self {
        Self::new(message)
    }
}

impl From<alloc::string::String> for RoutineError {
    fn from(message: alloc::string::String) -> Self {
        Self::new(message)
    }
}

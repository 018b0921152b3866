// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised while setting up a render.  Once a `Renderer` exists
//! the render itself cannot fail, so every variant here describes a
//! bad parameter caught before any column is dispatched.

use failure::Fail;

/// A rejected viewport or renderer parameter.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// One of the image dimensions was zero.
    #[fail(
        display = "resolution must be positive in both dimensions, got {}x{}",
        width, height
    )]
    InvalidResolution {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// The scale was zero, negative, or not a finite number.
    #[fail(display = "scale must be a positive finite number, got {}", _0)]
    InvalidScale(f64),

    /// The iteration limit was zero.
    #[fail(display = "iteration limit must be at least 1")]
    InvalidIterations,

    /// The worker count was zero.
    #[fail(display = "thread count must be at least 1")]
    InvalidThreads,
}

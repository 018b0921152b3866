#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring `z` and adding `c` never sends `z` off
//! to infinity.  For every pixel of the image we take the matching
//! point, iterate, and count how many iterations it took to escape the
//! radius-2 disk.  That count is the "velocity" of the point, and is
//! used as a hue on the color wheel.  Points that never escape are the
//! black heart of the image.
//!
//! Rendering is split by column: each column is painted by one worker
//! into its own slice of the pixel buffer, and the buffer is handed
//! back only after every worker is done.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod color;
pub mod error;
pub mod escape;
pub mod planes;
pub mod render;

pub use color::{hsv_to_rgba, iteration_color, Rgba};
pub use error::RenderError;
pub use escape::{escape_time, ColumnSequence};
pub use planes::{Pixel, Viewport};
pub use render::{ColumnTask, PixelBuffer, Renderer};

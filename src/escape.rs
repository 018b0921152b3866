// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  A point `c` belongs to the Mandelbrot set
//! if iterating `z -> z*z + c` never carries `z` further than 2 from
//! the origin.  We can't iterate forever, so each point gets a fixed
//! budget of iterations, and the number of iterations it took to leave
//! the radius-2 disk is the "velocity" used to color the pixel.

use num::Complex;

/// Returns the iteration at which `c` escaped, or 0 if it was still
/// inside the radius-2 disk after `limit` iterations.
///
/// The recurrence is written out on the real and imaginary parts and
/// compares the squared magnitude against 4, so there is neither a
/// complex multiplication nor a square root in the loop.  The squared
/// magnitude tested at iteration `i` is the one of the value *before*
/// that iteration's update, so a point exactly on the circle `|c| == 2`
/// is only caught on the second iteration.
#[inline]
pub fn escape_time(c: Complex<f64>, limit: usize) -> usize {
    let (ca, cb) = (c.re, c.im);
    let (mut za, mut zb) = (ca, cb);
    for i in 1..=limit {
        let zas = za * za;
        let zbs = zb * zb;

        zb = 2.0 * za * zb + cb;
        za = zas - zbs + ca;

        if zas + zbs > 4.0 {
            return i;
        }
    }
    0
}

/// The escape times of every row of one column, top to bottom.  The
/// point is advanced by a fixed step between rows rather than being
/// mapped from its pixel coordinates again.
#[derive(Clone, Debug)]
pub struct ColumnSequence {
    point: Complex<f64>,
    step: Complex<f64>,
    remaining: usize,
    limit: usize,
    started: bool,
}

impl ColumnSequence {
    /// Starts at `origin` and yields `rows` escape times.
    pub fn new(origin: Complex<f64>, step: Complex<f64>, rows: usize, limit: usize) -> Self {
        ColumnSequence {
            point: origin,
            step,
            remaining: rows,
            limit,
            started: false,
        }
    }
}

impl Iterator for ColumnSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        if self.started {
            self.point = self.point + self.step;
        } else {
            self.started = true;
        }
        self.remaining -= 1;
        Some(escape_time(self.point, self.limit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ColumnSequence {}

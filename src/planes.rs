//! Contains the Viewport struct, which describes the relationship
//! between the integral pixel plane, with an origin at 0,0 in the
//! upper-left corner, and a window onto the complex plane described by
//! a center point and a scale.
//!
//! The imaginary part grows with the row index: row 0 carries the most
//! negative imaginary part of the window, and walking down a column
//! adds `distance_per_pixel()` to the imaginary part at every row.
use num::Complex;

use crate::error::RenderError;

/// Describes the x, y of a pixel in the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// A window onto the complex plane, rendered at a fixed resolution
/// with a fixed iteration limit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    center: Complex<f64>,
    scale: f64,
    width: usize,
    height: usize,
    limit: usize,
    // Width and height of a single pixel in plane units.
    distance_per_pixel: f64,
}

impl Viewport {
    /// Takes the center of the window, the scale (the distance from the
    /// center to the nearer edge of the window, in plane units), the
    /// resolution in pixels, and the iteration limit.
    pub fn new(
        center: Complex<f64>,
        scale: f64,
        width: usize,
        height: usize,
        limit: usize,
    ) -> Result<Viewport, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidResolution { width, height });
        }

        if !scale.is_finite() || scale <= 0.0 {
            return Err(RenderError::InvalidScale(scale));
        }

        if limit == 0 {
            return Err(RenderError::InvalidIterations);
        }

        // The smaller dimension spans exactly 2 * scale.
        let reference = width.min(height) as f64;
        let distance_per_pixel = scale / (reference / 2.0);

        Ok(Viewport {
            center,
            scale,
            width,
            height,
            limit,
            distance_per_pixel,
        })
    }

    /// The center of the window.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }

    /// The half-width of the window along its smaller dimension.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Iteration limit for every point in the window.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The total number of pixels in the image.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false; a viewport cannot be built with a zero dimension.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance in plane units between neighbouring pixels.
    pub fn distance_per_pixel(&self) -> f64 {
        self.distance_per_pixel
    }

    /// Given a pixel on the integral plane, return the complex number
    /// at the equivalent location in the window.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let dx = pixel.0 as f64 - (self.width / 2) as f64;
        let dy = pixel.1 as f64 - (self.height / 2) as f64;
        Complex::new(
            self.center.re + dx * self.distance_per_pixel,
            self.center.im + dy * self.distance_per_pixel,
        )
    }

    /// The point at the top of a column.
    pub fn column_origin(&self, column: usize) -> Complex<f64> {
        self.pixel_to_point(&Pixel(column, 0))
    }

    /// The offset added to a point to move one row down a column.
    pub fn row_step(&self) -> Complex<f64> {
        Complex::new(0.0, self.distance_per_pixel)
    }
}

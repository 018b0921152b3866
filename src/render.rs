// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The image is cut into columns.  Every column is an independent
//! piece of work: its top point comes from the viewport, and every row
//! below it is one step further along the imaginary axis.  A pool of
//! worker threads pulls columns off a shared queue until the queue is
//! empty, and the pixel buffer is only handed back once every worker
//! has been joined.
//!
//! The buffer is stored column-major, so each column is one contiguous
//! slice.  The queue hands every slice out exactly once, which is what
//! lets the workers write pixels without any locking.

use std::convert::TryFrom;
use std::slice::ChunksMut;
use std::sync::{Arc, Mutex};

use image::RgbaImage;
use itertools::iproduct;
use num::Complex;

use crate::color::{iteration_color, Rgba};
use crate::error::RenderError;
use crate::escape::ColumnSequence;
use crate::planes::Viewport;

const CHANNELS: usize = 4;

/// A width x height grid of RGBA pixels, stored column by column.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A fully transparent black buffer.  Both dimensions must be
    /// positive.
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidResolution { width, height });
        }
        Ok(PixelBuffer::blank(width, height))
    }

    // Dimensions are checked by the caller.
    fn blank(width: usize, height: usize) -> Self {
        PixelBuffer {
            width,
            height,
            data: vec![0 as u8; width * height * CHANNELS],
        }
    }

    fn for_viewport(viewport: &Viewport) -> Self {
        PixelBuffer::blank(viewport.width(), viewport.height())
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The color of the pixel at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let offset = (x * self.height + y) * CHANNELS;
        let mut pixel = [0 as u8; CHANNELS];
        pixel.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        pixel
    }

    /// The raw bytes of one column, top to bottom.
    pub fn column(&self, x: usize) -> &[u8] {
        let len = self.height * CHANNELS;
        &self.data[x * len..(x + 1) * len]
    }

    /// Disjoint mutable slices, one per column, left to right.
    pub fn columns_mut(&mut self) -> ChunksMut<u8> {
        self.data.chunks_mut(self.height * CHANNELS)
    }

    /// The pixels in row-major order, the layout image encoders expect.
    pub fn to_row_major(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len());
        for (y, x) in iproduct!(0..self.height, 0..self.width) {
            bytes.extend_from_slice(&self.pixel(x, y));
        }
        bytes
    }

    /// Copy the buffer into an image ready for encoding.  Returns None
    /// if a dimension does not fit the image's `u32` sizes.
    pub fn to_image(&self) -> Option<RgbaImage> {
        let width = u32::try_from(self.width).ok()?;
        let height = u32::try_from(self.height).ok()?;
        RgbaImage::from_raw(width, height, self.to_row_major())
    }
}

/// Everything a worker needs to paint one column.  Built by the
/// renderer and moved into the worker; never modified afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColumnTask {
    /// Column index.
    pub x: usize,
    /// The point at row 0.
    pub origin: Complex<f64>,
    /// The offset between consecutive rows.
    pub step: Complex<f64>,
    /// Number of rows.
    pub rows: usize,
    /// Iteration limit for every row.
    pub limit: usize,
}

impl ColumnTask {
    /// The escape times of this column, top to bottom.
    pub fn sequence(&self) -> ColumnSequence {
        ColumnSequence::new(self.origin, self.step, self.rows, self.limit)
    }

    /// Color every row of the column into `column`, which must hold
    /// `rows` pixels.
    pub fn paint(&self, column: &mut [u8]) {
        debug_assert_eq!(column.len(), self.rows * CHANNELS);
        for (pixel, count) in column.chunks_mut(CHANNELS).zip(self.sequence()) {
            pixel.copy_from_slice(&iteration_color(count));
        }
    }
}

type ColumnQueue<'a> = Arc<Mutex<std::vec::IntoIter<(ColumnTask, &'a mut [u8])>>>;

/// Renders a viewport into a pixel buffer, spreading the columns over
/// a fixed number of worker threads.
#[derive(Clone, Debug)]
pub struct Renderer {
    viewport: Viewport,
    threads: usize,
}

impl Renderer {
    /// A renderer using one worker per logical CPU.
    pub fn new(viewport: Viewport) -> Self {
        Renderer {
            viewport,
            threads: num_cpus::get(),
        }
    }

    /// A renderer using exactly `threads` workers (fewer if the image
    /// has fewer columns than that).
    pub fn with_threads(viewport: Viewport, threads: usize) -> Result<Self, RenderError> {
        if threads == 0 {
            return Err(RenderError::InvalidThreads);
        }
        Ok(Renderer { viewport, threads })
    }

    /// The viewport being rendered.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The number of workers a parallel render will start.
    pub fn workers(&self) -> usize {
        self.threads.min(self.viewport.width())
    }

    /// The task for column `x`.
    pub fn task(&self, x: usize) -> ColumnTask {
        ColumnTask {
            x,
            origin: self.viewport.column_origin(x),
            step: self.viewport.row_step(),
            rows: self.viewport.height(),
            limit: self.viewport.limit(),
        }
    }

    /// One task per column, left to right.
    pub fn tasks<'a>(&'a self) -> impl Iterator<Item = ColumnTask> + 'a {
        (0..self.viewport.width()).map(move |x| self.task(x))
    }

    /// The main function for single-threaded rendering.  Paints every
    /// column in order on the calling thread.
    pub fn render_single(&self) -> PixelBuffer {
        let mut buffer = PixelBuffer::for_viewport(&self.viewport);
        for (task, column) in self.tasks().zip(buffer.columns_mut()) {
            task.paint(column);
        }
        buffer
    }

    /// Paint every column on the worker pool and return the finished
    /// buffer.  Does not return until every worker has been joined; if
    /// a worker panicked, the panic is resumed here.
    pub fn render(&self) -> PixelBuffer {
        let workers = self.workers();
        debug!(
            "rendering {}x{} across {} workers",
            self.viewport.width(),
            self.viewport.height(),
            workers
        );

        let mut buffer = PixelBuffer::for_viewport(&self.viewport);
        {
            let work: Vec<(ColumnTask, &mut [u8])> =
                self.tasks().zip(buffer.columns_mut()).collect();
            let queue: ColumnQueue = Arc::new(Mutex::new(work.into_iter()));

            let joined = crossbeam::scope(|spawner| {
                for worker in 0..workers {
                    let queue = queue.clone();
                    spawner.spawn(move |_| {
                        let mut painted = 0;
                        loop {
                            // A poisoned queue means another worker
                            // panicked; stop and let the scope report it.
                            let next = match queue.lock() {
                                Ok(mut columns) => columns.next(),
                                Err(_) => None,
                            };
                            match next {
                                Some((task, column)) => {
                                    task.paint(column);
                                    painted += 1;
                                }
                                None => {
                                    break;
                                }
                            }
                        }
                        trace!("worker {} painted {} columns", worker, painted);
                    });
                }
            });

            if let Err(panic) = joined {
                std::panic::resume_unwind(panic);
            }
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BLACK;
    use crate::escape::escape_time;
    use crate::planes::Pixel;

    fn small_view() -> Viewport {
        Viewport::new(Complex::new(0.0, 0.0), 2.0, 4, 4, 50).unwrap()
    }

    #[test]
    fn renderer_rejects_zero_threads() {
        assert_eq!(
            Renderer::with_threads(small_view(), 0).err(),
            Some(RenderError::InvalidThreads)
        );
    }

    #[test]
    fn workers_never_outnumber_columns() {
        let renderer = Renderer::with_threads(small_view(), 64).unwrap();
        assert_eq!(renderer.workers(), 4);
        let renderer = Renderer::with_threads(small_view(), 3).unwrap();
        assert_eq!(renderer.workers(), 3);
    }

    #[test]
    fn tasks_cover_every_column() {
        let renderer = Renderer::with_threads(small_view(), 2).unwrap();
        let tasks: Vec<ColumnTask> = renderer.tasks().collect();
        assert_eq!(tasks.len(), 4);
        for (x, task) in tasks.iter().enumerate() {
            assert_eq!(task.x, x);
            assert_eq!(task.origin, small_view().pixel_to_point(&Pixel(x, 0)));
            assert_eq!(task.step, Complex::new(0.0, 1.0));
            assert_eq!(task.rows, 4);
            assert_eq!(task.limit, 50);
        }
    }

    #[test]
    fn small_view_end_to_end() {
        let view = small_view();
        let buffer = Renderer::with_threads(view, 4).unwrap().render();
        assert_eq!((buffer.width(), buffer.height()), (4, 4));

        for (x, y) in iproduct!(0..4, 0..4) {
            assert_eq!(buffer.pixel(x, y)[3], 255);
            let expected = iteration_color(escape_time(view.pixel_to_point(&Pixel(x, y)), 50));
            assert_eq!(buffer.pixel(x, y), expected, "pixel {},{}", x, y);
        }

        // -2-2i is the farthest corner from the origin.
        assert_eq!(escape_time(view.pixel_to_point(&Pixel(0, 0)), 50), 1);
        assert_eq!(buffer.pixel(0, 0), iteration_color(1));
        // The center is the origin itself.
        assert_eq!(escape_time(view.pixel_to_point(&Pixel(2, 2)), 50), 0);
        assert_eq!(buffer.pixel(2, 2), BLACK);
    }

    #[test]
    fn parallel_renders_are_deterministic() {
        let view = Viewport::new(Complex::new(-0.5, 0.0), 1.5, 96, 64, 200).unwrap();
        let renderer = Renderer::with_threads(view, 8).unwrap();
        let first = renderer.render();
        let second = renderer.render();
        assert_eq!(first, second);
        assert_eq!(first, renderer.render_single());
    }

    #[test]
    fn odd_shapes_render_with_any_worker_count() {
        let view = Viewport::new(Complex::new(-0.75, 0.1), 0.5, 7, 13, 100).unwrap();
        let reference = Renderer::with_threads(view, 1).unwrap().render_single();
        for threads in 1..10 {
            let buffer = Renderer::with_threads(view, threads).unwrap().render();
            assert_eq!(buffer, reference, "{} threads", threads);
        }
    }

    #[test]
    fn single_column_and_single_row() {
        let view = Viewport::new(Complex::new(0.0, 0.0), 1.0, 1, 5, 20).unwrap();
        let buffer = Renderer::new(view).render();
        assert_eq!(buffer.column(0).len(), 5 * CHANNELS);

        let view = Viewport::new(Complex::new(0.0, 0.0), 1.0, 5, 1, 20).unwrap();
        let buffer = Renderer::new(view).render();
        assert_eq!(buffer, Renderer::new(view).render_single());
    }

    #[test]
    fn paint_writes_only_its_column() {
        let renderer = Renderer::with_threads(small_view(), 1).unwrap();
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        if let Some(column) = buffer.columns_mut().nth(1) {
            renderer.task(1).paint(column);
        }
        for (x, y) in iproduct!(0..4, 0..4) {
            let alpha = buffer.pixel(x, y)[3];
            assert_eq!(alpha, if x == 1 { 255 } else { 0 });
        }
    }

    #[test]
    fn buffer_rejects_empty_dimensions() {
        assert_eq!(
            PixelBuffer::new(3, 0),
            Err(RenderError::InvalidResolution {
                width: 3,
                height: 0
            })
        );
        assert!(PixelBuffer::new(0, 3).is_err());

        let mut buffer = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buffer.columns_mut().count(), 3);
        assert!(buffer.column(2).iter().all(|b| *b == 0));
    }

    #[test]
    fn row_major_layout() {
        let view = Viewport::new(Complex::new(0.0, 0.0), 2.0, 3, 2, 10).unwrap();
        let buffer = Renderer::new(view).render();
        let bytes = buffer.to_row_major();
        assert_eq!(bytes.len(), 3 * 2 * CHANNELS);
        for (x, y) in iproduct!(0..3, 0..2) {
            let offset = (y * 3 + x) * CHANNELS;
            assert_eq!(&bytes[offset..offset + CHANNELS], &buffer.pixel(x, y)[..]);
        }

        let image = buffer.to_image().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.into_raw(), bytes);
    }
}

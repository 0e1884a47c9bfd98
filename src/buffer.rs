//! Dense 2D buffer used for every per-pixel channel.
//!
//! A [`Buffer2D`] is a rectangular grid of values addressed by `(x, y)`,
//! stored row-major. The denoiser uses it for color (`Vec3`), depth and
//! object id (`f32`) and reprojection validity (`bool`) channels.
//!
//! The pipeline's double-buffer pattern is expressed through [`Buffer2D::swap`]:
//! a pass writes into a scratch buffer while reading the stable one, then the
//! two slots exchange storage. No aliasing, no copies.

use bytemuck::Pod;
use rayon::prelude::*;

/// Rectangular grid of per-pixel values, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Buffer2D<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Buffer2D<T> {
    /// Create a buffer filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T> Buffer2D<T> {
    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)` pair, for dimension checks.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-area buffer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `(x, y)` lies inside the buffer, for signed coordinates.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    /// Write the value at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = value;
    }

    /// Flat row-major view of the pixel data.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Sequential iterator over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        // max(1): chunk size zero is not allowed; an empty buffer yields no
        // rows either way.
        self.data.chunks(self.width.max(1))
    }

    /// Parallel iterator over mutable rows, for the per-pixel passes.
    pub fn par_rows_mut(&mut self) -> impl IndexedParallelIterator<Item = &mut [T]> + '_
    where
        T: Send,
    {
        self.data.par_chunks_mut(self.width.max(1))
    }

    /// Exchange storage with another buffer of identical dimensions.
    pub fn swap(&mut self, other: &mut Self) {
        assert_eq!(
            self.dimensions(),
            other.dimensions(),
            "swap requires identical buffer dimensions"
        );
        std::mem::swap(&mut self.data, &mut other.data);
    }
}

impl<T: Copy> Buffer2D<T> {
    /// Read the value at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Overwrite this buffer's contents with another's of identical dimensions.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            self.dimensions(),
            other.dimensions(),
            "copy_from requires identical buffer dimensions"
        );
        self.data.copy_from_slice(&other.data);
    }
}

impl<T: Pod> Buffer2D<T> {
    /// Raw byte view of the pixel data, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

//! Square raster storage shared by every analysis stage.
//!
//! All rasters of one run are `size × size` and linearized row-major:
//! `index = y * size + x` with `x` the column and `y` the row.
use glam::Vec2;

use crate::error::{Error, Result};

/// Square, row-major grid of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    size: usize,
    data: Vec<T>,
}

/// Normalized terrain heights in `[0, 1]`.
pub type HeightGrid = Grid<f32>;

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`.
    pub fn new(size: usize, fill: T) -> Self {
        Self {
            size,
            data: vec![fill; size * size],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap row-major `data`; fails unless `data.len() == size * size`.
    pub fn from_vec(size: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != size * size {
            return Err(Error::DimensionMismatch {
                stage: "grid".into(),
                expected: size,
                actual: format!("{} samples", data.len()),
            });
        }
        Ok(Self { size, data })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                data.push(f(x, y));
            }
        }
        Self { size, data }
    }

    /// Side length in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.size && y < self.size);
        y * self.size + x
    }

    /// Value at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.data.get(self.index(x, y))
    }

    /// Value at signed indices clamped into the grid. Panics on an empty grid.
    #[inline]
    pub fn get_clamped(&self, ix: isize, iy: isize) -> &T {
        let max = self.size as isize - 1;
        let x = ix.clamp(0, max) as usize;
        let y = iy.clamp(0, max) as usize;
        &self.data[y * self.size + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.size || y >= self.size {
            return None;
        }
        let idx = self.index(x, y);
        self.data.get_mut(idx)
    }

    /// Writes `value` at `(x, y)`. Returns `false` and leaves the grid untouched when
    /// out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Iterate `(x, y, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let size = self.size;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % size, i / size, v))
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            size: self.size,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Grid<f32> {
    /// Minimum and maximum value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        Some(
            self.data
                .iter()
                .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Arithmetic mean of all cells; `0.0` for an empty grid.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }

    /// Nearest-cell lookup at `floor(p)` with clamped indices.
    #[inline]
    pub fn sample_nearest(&self, p: Vec2) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        *self.get_clamped(p.x.floor() as isize, p.y.floor() as isize)
    }

    /// Bilinear lookup at normalized coordinates `u, v` in `[0, 1]` (clamped), where
    /// `0` maps to the first sample and `1` to the last one.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let max = (self.size - 1) as f32;
        let fx = u.clamp(0.0, 1.0) * max;
        let fy = v.clamp(0.0, 1.0) * max;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);

        let h00 = *self.get_clamped(x0, y0);
        let h10 = *self.get_clamped(x0 + 1, y0);
        let h01 = *self.get_clamped(x0, y0 + 1);
        let h11 = *self.get_clamped(x0 + 1, y0 + 1);

        let top = h00 + (h10 - h00) * tx;
        let bottom = h01 + (h11 - h01) * tx;
        top + (bottom - top) * ty
    }

    /// Returns the first cell holding a non-finite value.
    pub fn find_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|v| !v.is_finite())
            .map(|i| (i % self.size, i / self.size))
    }
}

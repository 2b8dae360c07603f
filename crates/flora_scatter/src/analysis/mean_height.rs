//! Circular-window mean height filter.
//!
//! Every cell is replaced by the arithmetic mean of all heights whose cell center lies
//! within `radius` of its own center. The window is a hard disc with uniform weights and
//! it truncates at the grid border: border cells average fewer samples than interior
//! cells and no padding or wraparound is applied.
//!
//! The same sweep records `min + max` of each window into a [`NeighborhoodCache`], which
//! the relative height stage consumes.
use tracing::debug;

use crate::analysis::grid::{Grid, HeightGrid};
use crate::error::{Error, Result};

/// Per-cell sum of the minimum and maximum height inside the sampling window.
///
/// Produced once by [`mean_height`] and moved into
/// [`crate::analysis::relative_height::relative_height`].
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborhoodCache {
    min_max_sum: Grid<f32>,
}

impl NeighborhoodCache {
    #[inline]
    pub fn size(&self) -> usize {
        self.min_max_sum.size()
    }

    /// `min + max` of the window around `(x, y)`.
    #[inline]
    pub fn min_max_sum(&self, x: usize, y: usize) -> Option<f32> {
        self.min_max_sum.get(x, y).copied()
    }

    pub fn as_grid(&self) -> &Grid<f32> {
        &self.min_max_sum
    }
}

/// Output of the mean height stage.
#[derive(Clone, Debug)]
pub struct MeanHeightResult {
    pub mean: Grid<f32>,
    pub neighborhood: NeighborhoodCache,
}

/// Statistics of one circular window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowStats {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    pub count: usize,
}

/// Mean height filter with a circular sampling window.
#[derive(Clone, Copy, Debug)]
pub struct MeanHeightFilter {
    radius: f32,
}

impl MeanHeightFilter {
    /// Create a filter; `radius` must be finite and `>= 0`.
    pub fn new(radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::invalid_parameter(
                "mean_height",
                format!("circle sampler radius must be finite and >= 0, got {radius}"),
            ));
        }
        Ok(Self { radius })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Collects the statistics of the window centered on `(x, y)`. A cell outside the
    /// grid yields an empty window (`count == 0`).
    pub fn window(&self, heights: &HeightGrid, x: usize, y: usize) -> WindowStats {
        let size = heights.size();
        if x >= size || y >= size {
            return WindowStats {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                count: 0,
            };
        }
        let r = self.radius;
        let rr = r * r;
        let reach = r.floor() as usize;

        let x0 = x.saturating_sub(reach);
        let x1 = (x + reach).min(size - 1);
        let y0 = y.saturating_sub(reach);
        let y1 = (y + reach).min(size - 1);

        let mut sum = 0.0f64;
        let mut count = 0usize;
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        for cy in y0..=y1 {
            let dy = cy as f32 - y as f32;
            for cx in x0..=x1 {
                let dx = cx as f32 - x as f32;
                if dx * dx + dy * dy > rr {
                    continue;
                }
                let h = heights.as_slice()[cy * size + cx];
                sum += h as f64;
                count += 1;
                min = min.min(h);
                max = max.max(h);
            }
        }

        // The query cell itself always lies in its own window, so count >= 1.
        WindowStats {
            mean: (sum / count as f64) as f32,
            min,
            max,
            count,
        }
    }

    /// Runs the filter over the whole heightfield.
    pub fn apply(&self, heights: &HeightGrid) -> Result<MeanHeightResult> {
        let size = heights.size();
        if size == 0 {
            return Err(Error::invalid_parameter(
                "mean_height",
                "heightfield must not be empty",
            ));
        }

        let mut mean = Vec::with_capacity(size * size);
        let mut min_max_sum = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let stats = self.window(heights, x, y);
                mean.push(stats.mean);
                min_max_sum.push(stats.min + stats.max);
            }
        }

        debug!(
            "Mean height filter: {}x{} cells, radius {}.",
            size, size, self.radius
        );

        Ok(MeanHeightResult {
            mean: Grid::from_vec(size, mean)?,
            neighborhood: NeighborhoodCache {
                min_max_sum: Grid::from_vec(size, min_max_sum)?,
            },
        })
    }
}

/// Convenience wrapper around [`MeanHeightFilter::apply`].
pub fn mean_height(heights: &HeightGrid, radius: f32) -> Result<MeanHeightResult> {
    MeanHeightFilter::new(radius)?.apply(heights)
}

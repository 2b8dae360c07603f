//! Central-difference slope map.
//!
//! ```text
//! dx = (h[min(x + d, W - 1), y] - h[max(x - d, 0), y]) / 2
//! dy = (h[x, min(y + d, W - 1)] - h[x, max(y - d, 0)]) / 2
//! slope = sqrt(dx² + dy²)
//! ```
//!
//! Near the border the neighbor indices are clamped instead of mirrored, so the
//! difference is one-sided there.
//!
//! The raw slopes are normalized with the global minimum and maximum collected in the
//! same sweep. The deployed normalization divides by `max + min` (see
//! [`SLOPE_NORMALIZATION`]); `max - min` was most likely intended. With
//! `max + min == 0` the division yields the IEEE result (NaN for `0 / 0`) and is left
//! unmasked.
use tracing::debug;

use crate::analysis::grid::{Grid, HeightGrid};
use crate::error::{Error, Result};

/// Denominator used when normalizing raw slopes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeNormalization {
    /// `(slope - min) / (max + min)`.
    MaxPlusMin,
    /// `(slope - min) / (max - min)`.
    MaxMinusMin,
}

impl SlopeNormalization {
    #[inline]
    pub fn normalize(self, slope: f32, min: f32, max: f32) -> f32 {
        match self {
            SlopeNormalization::MaxPlusMin => (slope - min) / (max + min),
            SlopeNormalization::MaxMinusMin => (slope - min) / (max - min),
        }
    }
}

/// Normalization applied by [`slope`]. Divides by `max + min`, which does not map the
/// range onto `[0, 1]` when `min > 0`; [`SlopeNormalization::MaxMinusMin`] does.
pub const SLOPE_NORMALIZATION: SlopeNormalization = SlopeNormalization::MaxPlusMin;

/// Output of the slope stage.
#[derive(Clone, Debug)]
pub struct SlopeResult {
    /// Normalized slope per cell.
    pub slope: Grid<f32>,
    /// Smallest raw slope before normalization.
    pub min: f32,
    /// Largest raw slope before normalization.
    pub max: f32,
}

/// Raw (unnormalized) slope at `(x, y)`; `0.0` outside the grid.
#[inline]
pub fn raw_slope_at(heights: &HeightGrid, x: usize, y: usize, d: usize) -> f32 {
    let size = heights.size();
    if x >= size || y >= size {
        return 0.0;
    }
    let last = size - 1;
    let h = heights.as_slice();
    let at = |cx: usize, cy: usize| h[cy * size + cx];

    let dx = (at((x + d).min(last), y) - at(x.saturating_sub(d), y)) / 2.0;
    let dy = (at(x, (y + d).min(last)) - at(x, y.saturating_sub(d))) / 2.0;
    (dx * dx + dy * dy).sqrt()
}

/// Computes the normalized slope map with sampling distance `sample_distance >= 1`.
pub fn slope(heights: &HeightGrid, sample_distance: usize) -> Result<SlopeResult> {
    slope_with(heights, sample_distance, SLOPE_NORMALIZATION)
}

/// Same as [`slope`] with an explicit normalization.
pub fn slope_with(
    heights: &HeightGrid,
    sample_distance: usize,
    normalization: SlopeNormalization,
) -> Result<SlopeResult> {
    if sample_distance == 0 {
        return Err(Error::invalid_parameter(
            "slope",
            "slope sample distance must be >= 1",
        ));
    }
    let size = heights.size();
    if size == 0 {
        return Err(Error::invalid_parameter(
            "slope",
            "heightfield must not be empty",
        ));
    }

    let mut raw = Vec::with_capacity(size * size);
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for y in 0..size {
        for x in 0..size {
            let s = raw_slope_at(heights, x, y, sample_distance);
            if s > max {
                max = s;
            }
            if s < min {
                min = s;
            }
            raw.push(s);
        }
    }

    debug!("Slope range before normalization: [{}, {}].", min, max);

    for s in raw.iter_mut() {
        *s = normalization.normalize(*s, min, max);
    }

    Ok(SlopeResult {
        slope: Grid::from_vec(size, raw)?,
        min,
        max,
    })
}

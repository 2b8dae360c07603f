//! Moisture compositing.
//!
//! Combines raw height, slope and relative height (each shaped by a response curve and
//! weighted) with the water and water-spread rasters:
//!
//! ```text
//! base              = height_curve(raw) * height_weight
//! slope_influence   = slope_curve(slope) * slope_weight
//! rel_influence     = relative_height_curve(relative) * relative_weight
//! relative_moisture = rel_influence - slope_influence + 1
//! water             = water + water_spread * vertical_water_spread_curve(relative)
//! moisture          = clamp01((base + water) * relative_moisture + rel_influence * omega) + water
//! ```
//!
//! Only the bracketed term is clamped. The trailing water contribution can push the
//! final value above `1`.
use crate::analysis::grid::{Grid, HeightGrid};
use crate::curve::{shared, CurveRef, LinearCurve};
use crate::error::{Error, Result};

/// Weights, attenuation and curves of the moisture compositor.
#[derive(Clone, Debug)]
pub struct MoistureConfig {
    /// Weight of the height response, typically in `[0, 2]`.
    pub height_weight: f32,
    /// Weight of the slope response, typically in `[0, 2]`.
    pub slope_weight: f32,
    /// Weight of the relative height response, typically in `[0, 2]`.
    pub relative_weight: f32,
    /// Attenuation of the direct relative height contribution, in `[0, 1]`.
    pub omega: f32,
    pub height_curve: CurveRef,
    pub slope_curve: CurveRef,
    pub relative_height_curve: CurveRef,
    pub vertical_water_spread_curve: CurveRef,
}

impl Default for MoistureConfig {
    fn default() -> Self {
        Self {
            height_weight: 1.0,
            slope_weight: 1.0,
            relative_weight: 1.0,
            omega: 0.5,
            height_curve: shared(LinearCurve::identity()),
            slope_curve: shared(LinearCurve::identity()),
            relative_height_curve: shared(LinearCurve::identity()),
            vertical_water_spread_curve: shared(LinearCurve::identity()),
        }
    }
}

impl MoistureConfig {
    /// Sets the height, slope and relative height weights.
    pub fn with_weights(mut self, height: f32, slope: f32, relative: f32) -> Self {
        self.height_weight = height;
        self.slope_weight = slope;
        self.relative_weight = relative;
        self
    }

    pub fn with_omega(mut self, omega: f32) -> Self {
        self.omega = omega;
        self
    }

    pub fn with_height_curve(mut self, curve: CurveRef) -> Self {
        self.height_curve = curve;
        self
    }

    pub fn with_slope_curve(mut self, curve: CurveRef) -> Self {
        self.slope_curve = curve;
        self
    }

    pub fn with_relative_height_curve(mut self, curve: CurveRef) -> Self {
        self.relative_height_curve = curve;
        self
    }

    pub fn with_vertical_water_spread_curve(mut self, curve: CurveRef) -> Self {
        self.vertical_water_spread_curve = curve;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("height_weight", self.height_weight),
            ("slope_weight", self.slope_weight),
            ("relative_weight", self.relative_weight),
            ("omega", self.omega),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "moisture {name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Moisture of a single cell.
    #[inline]
    pub fn composite(
        &self,
        raw_height: f32,
        slope: f32,
        relative_height: f32,
        water: f32,
        water_spread: f32,
    ) -> f32 {
        let base = self.height_curve.evaluate(raw_height) * self.height_weight;
        let slope_influence = self.slope_curve.evaluate(slope) * self.slope_weight;
        let rel_influence =
            self.relative_height_curve.evaluate(relative_height) * self.relative_weight;
        let relative_moisture = rel_influence - slope_influence + 1.0;
        let water_contribution =
            water + water_spread * self.vertical_water_spread_curve.evaluate(relative_height);

        ((base + water_contribution) * relative_moisture + rel_influence * self.omega)
            .clamp(0.0, 1.0)
            + water_contribution
    }
}

/// Rasters consumed by the compositor; all must share one size.
#[derive(Clone, Copy, Debug)]
pub struct MoistureInputs<'a> {
    pub heights: &'a HeightGrid,
    pub slope: &'a Grid<f32>,
    pub relative_height: &'a Grid<f32>,
    pub water: &'a Grid<f32>,
    pub water_spread: &'a Grid<f32>,
}

impl MoistureInputs<'_> {
    fn check_sizes(&self) -> Result<usize> {
        let size = self.heights.size();
        let others = [
            ("slope", self.slope.size()),
            ("relative_height", self.relative_height.size()),
            ("water", self.water.size()),
            ("water_spread", self.water_spread.size()),
        ];
        for (name, other) in others {
            if other != size {
                return Err(Error::DimensionMismatch {
                    stage: "moisture".into(),
                    expected: size,
                    actual: format!("{other}x{other} {name} raster"),
                });
            }
        }
        Ok(size)
    }
}

/// Composites the moisture map.
pub fn moisture(inputs: MoistureInputs<'_>, config: &MoistureConfig) -> Result<Grid<f32>> {
    let size = inputs.check_sizes()?;
    let h = inputs.heights.as_slice();
    let s = inputs.slope.as_slice();
    let r = inputs.relative_height.as_slice();
    let w = inputs.water.as_slice();
    let ws = inputs.water_spread.as_slice();

    let data = (0..size * size)
        .map(|i| config.composite(h[i], s[i], r[i], w[i], ws[i]))
        .collect();
    Grid::from_vec(size, data)
}

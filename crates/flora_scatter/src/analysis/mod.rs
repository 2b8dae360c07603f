//! Terrain analysis: derived rasters computed from a heightfield.
//!
//! [`TerrainAnalysisPipeline`] runs the stages in order:
//! 1. [`mean_height`]: circular-window smoothing plus the neighborhood min/max cache.
//! 2. [`relative_height`]: relief amplification from that cache.
//! 3. [`slope`]: central-difference gradient magnitude, globally normalized.
//! 4. [`moisture`]: curve-driven compositing with the external water rasters.
//!
//! Every run rebuilds all rasters from scratch. A failed run returns an error and no
//! partial maps.
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{Error, Result};

pub mod grid;
pub mod mean_height;
pub mod moisture;
pub mod relative_height;
pub mod slope;
pub mod texture;

pub use grid::{Grid, HeightGrid};
pub use mean_height::{MeanHeightFilter, MeanHeightResult, NeighborhoodCache};
pub use moisture::{MoistureConfig, MoistureInputs};
pub use relative_height::RelativeHeightOffset;
pub use slope::{SlopeNormalization, SlopeResult, SLOPE_NORMALIZATION};
pub use texture::{RgbaTexture, Texture, TextureChannel};

/// Configuration of the analysis pipeline.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Radius of the mean height sampling circle, in cells.
    pub circle_sampler_radius: f32,
    /// Neighbor distance of the slope central difference, `>= 1`.
    pub slope_sample_distance: usize,
    /// Offset mode of the relative height map.
    pub relative_height_offset: RelativeHeightOffset,
    /// Moisture compositing weights and curves.
    pub moisture: MoistureConfig,
    /// Channel of the water raster holding the signal.
    pub water_channel: TextureChannel,
    /// Channel of the water-spread raster holding the signal.
    pub water_spread_channel: TextureChannel,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            circle_sampler_radius: 3.0,
            slope_sample_distance: 1,
            relative_height_offset: RelativeHeightOffset::GlobalMean,
            moisture: MoistureConfig::default(),
            water_channel: TextureChannel::R,
            water_spread_channel: TextureChannel::A,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circle_sampler_radius(mut self, radius: f32) -> Self {
        self.circle_sampler_radius = radius;
        self
    }

    pub fn with_slope_sample_distance(mut self, distance: usize) -> Self {
        self.slope_sample_distance = distance;
        self
    }

    pub fn with_relative_height_offset(mut self, offset: RelativeHeightOffset) -> Self {
        self.relative_height_offset = offset;
        self
    }

    pub fn with_moisture(mut self, moisture: MoistureConfig) -> Self {
        self.moisture = moisture;
        self
    }

    /// Sets the channels read from the water and water-spread rasters.
    pub fn with_water_channels(mut self, water: TextureChannel, spread: TextureChannel) -> Self {
        self.water_channel = water;
        self.water_spread_channel = spread;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.circle_sampler_radius.is_finite() || self.circle_sampler_radius < 0.0 {
            return Err(Error::InvalidConfig(
                "circle_sampler_radius must be finite and >= 0".into(),
            ));
        }
        if self.slope_sample_distance < 1 {
            return Err(Error::InvalidConfig(
                "slope_sample_distance must be >= 1".into(),
            ));
        }
        if let RelativeHeightOffset::Fixed(v) = self.relative_height_offset {
            if !v.is_finite() {
                return Err(Error::InvalidConfig(
                    "relative height offset must be finite".into(),
                ));
            }
        }
        self.moisture.validate()
    }
}

/// Inputs of one analysis run.
#[derive(Clone, Default)]
pub struct AnalysisInputs {
    /// Normalized heightfield; required.
    pub heights: Option<HeightGrid>,
    /// Pre-rendered water raster.
    pub water: Option<Arc<dyn Texture>>,
    /// Pre-rendered water-spread raster.
    pub water_spread: Option<Arc<dyn Texture>>,
}

impl AnalysisInputs {
    pub fn new(heights: HeightGrid) -> Self {
        Self {
            heights: Some(heights),
            water: None,
            water_spread: None,
        }
    }

    pub fn with_water<T: Texture + 'static>(mut self, texture: T) -> Self {
        self.water = Some(Arc::new(texture));
        self
    }

    pub fn with_water_spread<T: Texture + 'static>(mut self, texture: T) -> Self {
        self.water_spread = Some(Arc::new(texture));
        self
    }
}

/// All rasters produced by one analysis run. Every grid has the heightfield's size.
#[derive(Clone, Debug)]
pub struct TerrainMaps {
    pub heights: HeightGrid,
    pub mean_height: Grid<f32>,
    pub relative_height: Grid<f32>,
    pub slope: Grid<f32>,
    pub moisture: Grid<f32>,
    pub water: Grid<f32>,
    pub water_spread: Grid<f32>,
}

impl TerrainMaps {
    /// Side length shared by every map.
    pub fn size(&self) -> usize {
        self.heights.size()
    }

    /// Maps paired with a stable name, for export.
    pub fn named(&self) -> [(&'static str, &Grid<f32>); 7] {
        [
            ("height", &self.heights),
            ("mean_height", &self.mean_height),
            ("relative_height", &self.relative_height),
            ("slope", &self.slope),
            ("moisture", &self.moisture),
            ("water", &self.water),
            ("water_spread", &self.water_spread),
        ]
    }

    /// Checks that every map has the heightfield's size.
    pub fn validate(&self) -> Result<()> {
        let size = self.size();
        for (name, grid) in self.named() {
            if grid.size() != size {
                return Err(Error::DimensionMismatch {
                    stage: "terrain_maps".into(),
                    expected: size,
                    actual: format!("{0}x{0} {name} map", grid.size()),
                });
            }
        }
        Ok(())
    }
}

/// Orchestrates Mean -> Relative -> Slope -> Moisture.
#[derive(Clone, Debug)]
pub struct TerrainAnalysisPipeline {
    config: AnalysisConfig,
}

impl TerrainAnalysisPipeline {
    /// Create a pipeline; fails if the configuration is invalid.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs all stages on `inputs`.
    pub fn run(&self, inputs: &AnalysisInputs) -> Result<TerrainMaps> {
        let started = Instant::now();
        let heights = inputs
            .heights
            .as_ref()
            .ok_or_else(|| Error::missing_input("analysis", "heightfield"))?;
        let size = heights.size();
        if size == 0 {
            return Err(Error::missing_input("analysis", "heightfield"));
        }
        if let Some((x, y)) = heights.find_non_finite() {
            return Err(Error::Stage {
                stage: "analysis".into(),
                x,
                y,
                message: "heightfield sample is not finite".into(),
            });
        }

        let water = self.read_input(
            inputs.water.as_deref(),
            self.config.water_channel,
            size,
            "water",
        );
        let water_spread = self.read_input(
            inputs.water_spread.as_deref(),
            self.config.water_spread_channel,
            size,
            "water_spread",
        );

        let stage = Instant::now();
        let MeanHeightResult { mean, neighborhood } =
            MeanHeightFilter::new(self.config.circle_sampler_radius)?.apply(heights)?;
        info!("Mean height map created in {:?}.", stage.elapsed());

        let stage = Instant::now();
        let relative = relative_height::relative_height(
            heights,
            neighborhood,
            self.config.relative_height_offset,
        )?;
        info!("Relative height map created in {:?}.", stage.elapsed());

        let stage = Instant::now();
        let SlopeResult { slope, .. } =
            slope::slope(heights, self.config.slope_sample_distance)?;
        info!("Slope map created in {:?}.", stage.elapsed());

        let stage = Instant::now();
        let moisture = moisture::moisture(
            MoistureInputs {
                heights,
                slope: &slope,
                relative_height: &relative,
                water: &water,
                water_spread: &water_spread,
            },
            &self.config.moisture,
        )?;
        info!("Moisture map created in {:?}.", stage.elapsed());

        info!(
            "Finished creating all maps ({}x{}) after {:?}.",
            size,
            size,
            started.elapsed()
        );

        Ok(TerrainMaps {
            heights: heights.clone(),
            mean_height: mean,
            relative_height: relative,
            slope,
            moisture,
            water,
            water_spread,
        })
    }

    fn read_input(
        &self,
        source: Option<&dyn Texture>,
        channel: TextureChannel,
        size: usize,
        name: &str,
    ) -> Grid<f32> {
        match source {
            Some(source) => texture::read_channel(source, channel, size, name),
            None => {
                warn!("No '{}' raster supplied; using zeros.", name);
                Grid::new(size, 0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{shared, ConstantCurve, KeyframeCurve};

    fn hills(size: usize) -> HeightGrid {
        Grid::from_fn(size, |x, y| {
            let fx = x as f32 / size as f32;
            let fy = y as f32 / size as f32;
            (0.5 + 0.25 * (fx * 6.0).sin() * (fy * 4.0).cos()).clamp(0.0, 1.0)
        })
    }

    #[test]
    fn missing_heightfield_aborts() {
        let pipeline = TerrainAnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let err = pipeline.run(&AnalysisInputs::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingInput { ref input, .. } if input == "heightfield"
        ));
    }

    #[test]
    fn non_finite_height_reports_coordinates() {
        let mut h = hills(8);
        assert!(h.set(5, 2, f32::INFINITY));
        let pipeline = TerrainAnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let err = pipeline.run(&AnalysisInputs::new(h)).unwrap_err();
        assert!(matches!(err, Error::Stage { x: 5, y: 2, .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AnalysisConfig::default().with_slope_sample_distance(0);
        assert!(TerrainAnalysisPipeline::new(config).is_err());
        let config = AnalysisConfig::default().with_circle_sampler_radius(-2.0);
        assert!(TerrainAnalysisPipeline::new(config).is_err());
    }

    #[test]
    fn produces_maps_of_equal_size() {
        let pipeline = TerrainAnalysisPipeline::new(
            AnalysisConfig::default().with_circle_sampler_radius(2.0),
        )
        .unwrap();
        let maps = pipeline.run(&AnalysisInputs::new(hills(16))).unwrap();
        assert_eq!(maps.size(), 16);
        maps.validate().unwrap();
        assert!(maps.water.iter().all(|&v| v == 0.0));
        assert!(maps.slope.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn reads_configured_water_channels() {
        let size = 4;
        let water = Grid::from_fn(size, |x, _| x as f32 / 4.0);
        let spread = Grid::from_fn(size, |_, y| y as f32 / 4.0);
        let config = AnalysisConfig::default().with_moisture(
            MoistureConfig::default()
                .with_weights(0.0, 0.0, 0.0)
                .with_omega(0.0)
                .with_vertical_water_spread_curve(shared(ConstantCurve::new(1.0))),
        );
        let inputs = AnalysisInputs::new(hills(size))
            .with_water(RgbaTexture::from_grid(&water, TextureChannel::R))
            .with_water_spread(RgbaTexture::from_grid(&spread, TextureChannel::A));

        let maps = TerrainAnalysisPipeline::new(config)
            .unwrap()
            .run(&inputs)
            .unwrap();
        assert_eq!(maps.water, water);
        assert_eq!(maps.water_spread, spread);
        for (x, y, &m) in maps.moisture.cells() {
            let wc = water.get(x, y).unwrap() + spread.get(x, y).unwrap();
            assert!((m - (wc.clamp(0.0, 1.0) + wc)).abs() < 1e-6);
        }
    }

    #[test]
    fn flat_terrain_with_keyframe_slope_curve_yields_nan_moisture() {
        let config = AnalysisConfig::default().with_moisture(
            MoistureConfig::default()
                .with_slope_curve(shared(KeyframeCurve::from_pairs(&[(0.0, 1.0), (1.0, 0.0)]))),
        );
        let maps = TerrainAnalysisPipeline::new(config)
            .unwrap()
            .run(&AnalysisInputs::new(Grid::new(8, 0.5)))
            .unwrap();
        assert!(maps.slope.iter().all(|v| v.is_nan()));
        assert!(maps.moisture.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn runs_are_reproducible() {
        let pipeline = TerrainAnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let a = pipeline.run(&AnalysisInputs::new(hills(12))).unwrap();
        let b = pipeline.run(&AnalysisInputs::new(hills(12))).unwrap();
        assert_eq!(a.moisture, b.moisture);
        assert_eq!(a.relative_height, b.relative_height);
    }
}

//! Per-candidate acceptance test and world-space parameters.
//!
//! A candidate point in grid coordinates is looked up in the terrain maps at
//! `floor(x), floor(y)` (indices clamped), a species is drawn from the layer's
//! predominance table, and the species' curves give the acceptance probability
//!
//! ```text
//! p = (1 - water_spread) * height_curve(height) * slope_curve(slope) * moisture_curve(moisture)
//! ```
//!
//! The candidate is accepted when `p >= threshold`. A NaN anywhere in the product
//! rejects the candidate.
use std::f32::consts::TAU;

use glam::Vec2;
use rand::RngCore;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::analysis::TerrainMaps;
use crate::sampling::rand01;
use crate::scatter::plan::PlacementLayer;
use crate::scatter::runner::RunConfig;
use crate::scatter::selection::pick_species;
use crate::scatter::world::PlantInstance;
use crate::scatter::PlantSpecies;

/// Height raster fed into a species' height curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HeightSignal {
    /// Mean height (smoothed).
    #[default]
    Mean,
    /// Raw heightfield.
    Raw,
}

/// Raster values at one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    pub height: f32,
    pub slope: f32,
    pub moisture: f32,
    pub water_spread: f32,
}

/// The outcome for one candidate point.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementDecision {
    pub layer_index: usize,
    /// Candidate in grid coordinates.
    pub point: Vec2,
    pub species_index: usize,
    pub probability: f32,
    pub accepted: bool,
}

/// A decision plus whether the species draw fell off the predominance table.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub decision: PlacementDecision,
    pub fallback: bool,
}

/// Evaluates candidates against one set of terrain maps.
pub struct PlacementEvaluator<'a> {
    maps: &'a TerrainMaps,
    config: &'a RunConfig,
}

impl<'a> PlacementEvaluator<'a> {
    pub fn new(maps: &'a TerrainMaps, config: &'a RunConfig) -> Self {
        Self { maps, config }
    }

    /// Nearest-cell lookup of every raster the acceptance test reads.
    pub fn sample(&self, point: Vec2) -> CellSample {
        let height = match self.config.height_signal {
            HeightSignal::Mean => &self.maps.mean_height,
            HeightSignal::Raw => &self.maps.heights,
        };
        CellSample {
            height: height.sample_nearest(point),
            slope: self.maps.slope.sample_nearest(point),
            moisture: self.maps.moisture.sample_nearest(point),
            water_spread: self.maps.water_spread.sample_nearest(point),
        }
    }

    /// Multiplicative acceptance probability of `species` for `sample`.
    #[inline]
    pub fn acceptance_probability(species: &PlantSpecies, sample: &CellSample) -> f32 {
        (1.0 - sample.water_spread)
            * species.height.evaluate(sample.height)
            * species.slope.evaluate(sample.slope)
            * species.moisture.evaluate(sample.moisture)
    }

    /// Draws a species for `point` and applies the acceptance test.
    ///
    /// The layer must have passed [`PlacementLayer::validate`]. Consumes exactly one
    /// RNG draw.
    pub fn evaluate(
        &self,
        layer: &PlacementLayer,
        layer_index: usize,
        point: Vec2,
        rng: &mut dyn RngCore,
    ) -> Evaluation {
        let sample = self.sample(point);
        let selection = pick_species(&layer.predominance, rng);
        let probability = layer
            .species
            .get(selection.index)
            .map_or(0.0, |species| Self::acceptance_probability(species, &sample));

        Evaluation {
            decision: PlacementDecision {
                layer_index,
                point,
                species_index: selection.index,
                probability,
                accepted: probability >= self.config.threshold,
            },
            fallback: selection.fallback,
        }
    }

    /// World-space position, surface height and a random rotation for an accepted point.
    ///
    /// Grid `x` maps to world X and grid `y` to world Z. The height is sampled
    /// bilinearly from the raw heightfield at `(x / W, y / W)`. Consumes one RNG draw.
    pub fn world_parameters(
        &self,
        layer_id: &str,
        point: Vec2,
        species: &PlantSpecies,
        rng: &mut dyn RngCore,
    ) -> PlantInstance {
        let size = self.maps.size().max(1) as f32;
        let u = point.x / size;
        let v = point.y / size;
        let origin = self.config.terrain_origin;
        let extent = self.config.terrain_size;

        PlantInstance {
            world_x: origin.x + u * extent.x,
            height: origin.y + self.maps.heights.sample_bilinear(u, v) * extent.y,
            world_z: origin.z + v * extent.z,
            rotation: (rand01(rng) * TAU).rem_euclid(TAU),
            handle: species.handle.clone(),
            species_id: species.id.clone(),
            layer_id: layer_id.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::analysis::grid::Grid;
    use crate::curve::{shared, ConstantCurve, KeyframeCurve, LinearCurve};
    use crate::sampling::test_rng::SequenceRng;

    fn maps(size: usize) -> TerrainMaps {
        let heights = Grid::from_fn(size, |x, _| x as f32 / (size - 1) as f32);
        TerrainMaps {
            mean_height: Grid::new(size, 0.5),
            relative_height: Grid::new(size, 0.0),
            slope: Grid::new(size, 0.2),
            moisture: Grid::new(size, 0.8),
            water: Grid::new(size, 0.0),
            water_spread: Grid::new(size, 0.0),
            heights,
        }
    }

    fn identity_species(id: &str) -> PlantSpecies {
        PlantSpecies::new(id, id, 1.0)
            .with_height_curve(shared(LinearCurve::identity()))
            .with_slope_curve(shared(LinearCurve::identity()))
            .with_moisture_curve(shared(LinearCurve::identity()))
    }

    #[test]
    fn probability_is_product_of_curves() {
        let maps = maps(4);
        let config = RunConfig::default();
        let evaluator = PlacementEvaluator::new(&maps, &config);
        let sample = evaluator.sample(Vec2::new(1.5, 2.5));
        assert_eq!(sample.height, 0.5);
        let p = PlacementEvaluator::acceptance_probability(&identity_species("a"), &sample);
        assert!((p - 0.5 * 0.2 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn raw_height_signal_reads_heightfield() {
        let maps = maps(4);
        let config = RunConfig::default().with_height_signal(HeightSignal::Raw);
        let evaluator = PlacementEvaluator::new(&maps, &config);
        assert_eq!(evaluator.sample(Vec2::new(3.9, 0.0)).height, 1.0);
        // Points on the far edge clamp into the grid.
        assert_eq!(evaluator.sample(Vec2::new(4.0, 4.0)).height, 1.0);
    }

    #[test]
    fn water_spread_suppresses_placement() {
        let mut maps = maps(4);
        maps.water_spread = Grid::new(4, 1.0);
        let config = RunConfig::default().with_threshold(0.0);
        let evaluator = PlacementEvaluator::new(&maps, &config);
        let layer =
            PlacementLayer::new("l", vec![PlantSpecies::new("a", "a", 1.0)], vec![1.0], 1.0);
        let mut rng = SequenceRng::from_unit_draws(&[0.5]);
        let eval = evaluator.evaluate(&layer, 0, Vec2::new(1.0, 1.0), &mut rng);
        assert_eq!(eval.decision.probability, 0.0);
        // threshold 0 still accepts p == 0
        assert!(eval.decision.accepted);
    }

    #[test]
    fn threshold_decides_acceptance() {
        let maps = maps(4);
        let low = PlantSpecies::new("low", "low", 1.0)
            .with_height_curve(shared(ConstantCurve::new(0.3)));
        let high = PlantSpecies::new("high", "high", 1.0)
            .with_height_curve(shared(ConstantCurve::new(0.7)));
        let layer = PlacementLayer::new("l", vec![low, high], vec![0.5, 1.0], 1.0);
        let config = RunConfig::default().with_threshold(0.5);
        let evaluator = PlacementEvaluator::new(&maps, &config);

        let mut rng = SequenceRng::from_unit_draws(&[0.25, 0.75]);
        let first = evaluator.evaluate(&layer, 2, Vec2::new(0.0, 0.0), &mut rng);
        let second = evaluator.evaluate(&layer, 2, Vec2::new(0.0, 0.0), &mut rng);

        assert_eq!(first.decision.species_index, 0);
        assert!(!first.decision.accepted);
        assert_eq!(second.decision.species_index, 1);
        assert!(second.decision.accepted);
        assert_eq!(second.decision.layer_index, 2);
        assert!(!second.fallback);
    }

    #[test]
    fn fallback_is_reported() {
        let maps = maps(4);
        let config = RunConfig::default();
        let evaluator = PlacementEvaluator::new(&maps, &config);
        let layer = PlacementLayer::new(
            "l",
            vec![PlantSpecies::new("a", "a", 1.0), PlantSpecies::new("b", "b", 1.0)],
            vec![0.2, 0.4],
            1.0,
        );
        let mut rng = SequenceRng::from_unit_draws(&[0.9]);
        let eval = evaluator.evaluate(&layer, 0, Vec2::ZERO, &mut rng);
        assert!(eval.fallback);
        assert_eq!(eval.decision.species_index, 0);
    }

    #[test]
    fn world_parameters_map_grid_to_world() {
        let maps = maps(5);
        let config = RunConfig::default()
            .with_terrain_origin(Vec3::new(10.0, -2.0, 20.0))
            .with_terrain_size(Vec3::new(100.0, 50.0, 200.0));
        let evaluator = PlacementEvaluator::new(&maps, &config);
        let species = PlantSpecies::new("oak", "meshes/oak", 3.0);
        let mut rng = SequenceRng::from_unit_draws(&[0.5]);

        let instance =
            evaluator.world_parameters("trees", Vec2::new(2.5, 1.25), &species, &mut rng);
        assert!((instance.world_x - (10.0 + 0.5 * 100.0)).abs() < 1e-4);
        assert!((instance.world_z - (20.0 + 0.25 * 200.0)).abs() < 1e-4);
        // Heights ramp 0..1 along x; u = 0.5 sits halfway.
        assert!((instance.height - (-2.0 + 0.5 * 50.0)).abs() < 1e-4);
        assert!((instance.rotation - std::f32::consts::PI).abs() < 1e-5);
        assert_eq!(instance.species_id, "oak");
        assert_eq!(instance.handle, "meshes/oak");
        assert_eq!(instance.layer_id, "trees");
    }

    #[test]
    fn nan_slope_is_rejected_without_panicking() {
        let mut maps = maps(4);
        maps.slope = Grid::new(4, f32::NAN);
        let config = RunConfig::default().with_threshold(0.0);
        let evaluator = PlacementEvaluator::new(&maps, &config);
        let species = PlantSpecies::new("a", "a", 1.0)
            .with_slope_curve(shared(KeyframeCurve::from_pairs(&[(0.0, 1.0), (1.0, 0.0)])));
        let layer = PlacementLayer::new("l", vec![species], vec![1.0], 1.0);
        let mut rng = SequenceRng::from_unit_draws(&[0.5]);
        let eval = evaluator.evaluate(&layer, 0, Vec2::new(1.0, 1.0), &mut rng);
        assert!(eval.decision.probability.is_nan());
        assert!(!eval.decision.accepted);
    }
}

//! High-level runner placing the layers of a plan across analysed terrain.
use glam::{Vec2, Vec3};
use rand::RngCore;
use tracing::{info, warn};

use crate::analysis::TerrainMaps;
use crate::error::{Error, Result};
use crate::sampling::{PoissonDiskSampling, PositionSampling};
use crate::scatter::evaluator::{HeightSignal, PlacementDecision, PlacementEvaluator};
use crate::scatter::events::{EventSink, PlacementEvent, PlacementEventKind};
use crate::scatter::plan::{PlacementLayer, Plan};
use crate::scatter::selection::PredominanceCheck;
use crate::scatter::world::{PlantInstance, WorldPlacement};

/// Configuration for running a placement plan.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Candidates tried around each active Poisson disk point.
    pub max_attempts_per_point: usize,
    /// Minimum acceptance probability for a candidate to be placed.
    pub threshold: f32,
    /// World position of the terrain's grid origin.
    pub terrain_origin: Vec3,
    /// World extent of the terrain; `y` is the height of a heightfield value of `1.0`.
    pub terrain_size: Vec3,
    /// Height raster used by the species' height curves.
    pub height_signal: HeightSignal,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_point: crate::sampling::poisson_disk::DEFAULT_MAX_ATTEMPTS,
            threshold: 0.5,
            terrain_origin: Vec3::ZERO,
            terrain_size: Vec3::ONE,
            height_signal: HeightSignal::Mean,
        }
    }
}

impl RunConfig {
    /// Creates a new [`RunConfig`] for a terrain of the given world extent.
    pub fn new(terrain_size: Vec3) -> Self {
        Self {
            terrain_size,
            ..Default::default()
        }
    }

    pub fn with_max_attempts_per_point(mut self, max_attempts_per_point: usize) -> Self {
        self.max_attempts_per_point = max_attempts_per_point;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_terrain_origin(mut self, terrain_origin: Vec3) -> Self {
        self.terrain_origin = terrain_origin;
        self
    }

    pub fn with_terrain_size(mut self, terrain_size: Vec3) -> Self {
        self.terrain_size = terrain_size;
        self
    }

    pub fn with_height_signal(mut self, height_signal: HeightSignal) -> Self {
        self.height_signal = height_signal;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts_per_point == 0 {
            return Err(Error::InvalidConfig(
                "max_attempts_per_point must be > 0".into(),
            ));
        }
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if !self.terrain_origin.is_finite() {
            return Err(Error::InvalidConfig("terrain_origin must be finite".into()));
        }
        let s = self.terrain_size;
        if !s.is_finite() || s.x <= 0.0 || s.y < 0.0 || s.z <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "terrain_size must be finite with x, z > 0 and y >= 0, got {s}"
            )));
        }
        Ok(())
    }
}

/// A layer that was aborted during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerFailure {
    pub index: usize,
    pub id: String,
    pub message: String,
}

/// Result of running a placement plan or layer.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// One decision per evaluated candidate, in evaluation order.
    pub decisions: Vec<PlacementDecision>,
    /// Instances handed to the world.
    pub instances: Vec<PlantInstance>,
    /// Total candidate points evaluated.
    pub candidates_evaluated: usize,
    /// Total candidate points rejected.
    pub candidates_rejected: usize,
    /// Layers aborted by an invalid parameter.
    pub failed_layers: Vec<LayerFailure>,
}

impl RunResult {
    /// Creates a new empty [`RunResult`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placed plants.
    pub fn placed(&self) -> usize {
        self.instances.len()
    }

    fn absorb(&mut self, other: RunResult) {
        self.decisions.extend(other.decisions);
        self.instances.extend(other.instances);
        self.candidates_evaluated += other.candidates_evaluated;
        self.candidates_rejected += other.candidates_rejected;
        self.failed_layers.extend(other.failed_layers);
    }
}

/// Places vegetation layer by layer on one set of terrain maps.
pub struct VegetationPlacer<'a> {
    /// Run configuration applied to this placer.
    pub config: RunConfig,
    /// Analysed terrain the candidates are evaluated against.
    pub maps: &'a TerrainMaps,
}

impl<'a> VegetationPlacer<'a> {
    pub fn try_new(config: RunConfig, maps: &'a TerrainMaps) -> Result<Self> {
        config.validate()?;
        maps.validate()?;
        if maps.size() == 0 {
            return Err(Error::missing_input("placement", "terrain maps"));
        }
        Ok(Self { config, maps })
    }

    /// Runs the given plan, returning the result.
    pub fn run<R: RngCore>(
        &self,
        plan: &Plan,
        rng: &mut R,
        world: &mut dyn WorldPlacement,
    ) -> RunResult {
        self.run_with_events(plan, rng, world, &mut ())
    }

    /// Runs the given plan, reporting progress to `sink`.
    ///
    /// The world is cleared first. Layers run in plan order; a layer that fails
    /// validation is recorded in [`RunResult::failed_layers`] and the run continues.
    pub fn run_with_events<R: RngCore>(
        &self,
        plan: &Plan,
        rng: &mut R,
        world: &mut dyn WorldPlacement,
        sink: &mut dyn EventSink,
    ) -> RunResult {
        if sink.wants(PlacementEventKind::RunStarted) {
            sink.send(PlacementEvent::RunStarted {
                config: self.config.clone(),
                layer_count: plan.layers.len(),
            });
        }

        world.clear();
        let mut result = RunResult::new();

        for (index, layer) in plan.layers.iter().enumerate() {
            if !layer.enabled {
                info!("Layer '{}' is disabled; skipping.", layer.id);
                continue;
            }

            match self.run_layer(layer, index, rng, world, sink) {
                Ok(layer_result) => result.absorb(layer_result),
                Err(e) => {
                    warn!("Layer '{}' failed: {}.", layer.id, e);
                    let message = e.to_string();
                    if sink.wants(PlacementEventKind::Warning) {
                        sink.send(PlacementEvent::Warning {
                            context: format!("layer:{}", layer.id),
                            message: format!("Layer failed: {message}"),
                        });
                    }
                    if sink.wants(PlacementEventKind::LayerFailed) {
                        sink.send(PlacementEvent::LayerFailed {
                            index,
                            id: layer.id.clone(),
                            message: message.clone(),
                        });
                    }
                    result.failed_layers.push(LayerFailure {
                        index,
                        id: layer.id.clone(),
                        message,
                    });
                }
            }
        }

        info!(
            "Placement finished: {} plants from {} candidates ({} layers failed).",
            result.placed(),
            result.candidates_evaluated,
            result.failed_layers.len()
        );
        if sink.wants(PlacementEventKind::RunFinished) {
            sink.send(PlacementEvent::RunFinished {
                result: result.clone(),
            });
        }
        result
    }

    /// Runs a single layer with Poisson disk candidates of the layer's radius.
    pub fn run_layer<R: RngCore>(
        &self,
        layer: &PlacementLayer,
        layer_index: usize,
        rng: &mut R,
        world: &mut dyn WorldPlacement,
        sink: &mut dyn EventSink,
    ) -> Result<RunResult> {
        let sampler = PoissonDiskSampling::new(layer.radius)
            .with_max_attempts(self.config.max_attempts_per_point);
        self.run_layer_with_sampler(layer, layer_index, &sampler, rng, world, sink)
    }

    /// Runs a single layer with candidates from `sampler`.
    ///
    /// The layer is validated before any RNG draw, so a failed layer leaves the RNG
    /// untouched for the layers after it.
    pub fn run_layer_with_sampler<R: RngCore>(
        &self,
        layer: &PlacementLayer,
        layer_index: usize,
        sampler: &dyn PositionSampling,
        rng: &mut R,
        world: &mut dyn WorldPlacement,
        sink: &mut dyn EventSink,
    ) -> Result<RunResult> {
        let rng: &mut dyn RngCore = rng;

        if let PredominanceCheck::Incomplete { last } = layer.validate()? {
            warn!(
                "Layer '{}' predominance table ends at {} instead of 1.0; \
                 draws above it use the first species.",
                layer.id, last
            );
            if sink.wants(PlacementEventKind::Warning) {
                sink.send(PlacementEvent::Warning {
                    context: format!("layer:{}", layer.id),
                    message: format!(
                        "Predominance table ends at {last}; draws above it use the first species"
                    ),
                });
            }
        }

        if sink.wants(PlacementEventKind::LayerStarted) {
            sink.send(PlacementEvent::LayerStarted {
                index: layer_index,
                id: layer.id.clone(),
                species: layer.species_ids(),
                radius: layer.radius,
            });
        }

        let size = self.maps.size() as f32;
        let points: Vec<Vec2> = sampler
            .generate(Vec2::splat(size).into(), rng)?
            .into_iter()
            .map(Vec2::from)
            .collect();

        let evaluator = PlacementEvaluator::new(self.maps, &self.config);
        let mut result = RunResult::new();
        let mut fallbacks = 0usize;

        for point in points {
            let evaluation = evaluator.evaluate(layer, layer_index, point, rng);
            let decision = evaluation.decision;
            if evaluation.fallback {
                fallbacks += 1;
            }

            if sink.wants(PlacementEventKind::CandidateEvaluated) {
                sink.send(PlacementEvent::CandidateEvaluated {
                    decision: decision.clone(),
                });
            }

            let species = layer.species.get(decision.species_index);
            match species {
                Some(species) if decision.accepted => {
                    let instance = evaluator.world_parameters(&layer.id, point, species, rng);
                    if sink.wants(PlacementEventKind::PlantPlaced) {
                        sink.send(PlacementEvent::PlantPlaced {
                            layer_index,
                            instance: instance.clone(),
                        });
                    }
                    world.place(instance.clone());
                    result.instances.push(instance);
                }
                _ => result.candidates_rejected += 1,
            }
            result.candidates_evaluated += 1;
            result.decisions.push(decision);
        }

        if fallbacks > 0 {
            warn!(
                "Layer '{}': {} candidates fell back to the first species.",
                layer.id, fallbacks
            );
            if sink.wants(PlacementEventKind::Warning) {
                sink.send(PlacementEvent::Warning {
                    context: format!("layer:{}", layer.id),
                    message: format!("{fallbacks} candidates fell back to the first species"),
                });
            }
        }

        info!(
            "Layer '{}' placed {} of {} candidates.",
            layer.id,
            result.placed(),
            result.candidates_evaluated
        );
        if sink.wants(PlacementEventKind::LayerFinished) {
            sink.send(PlacementEvent::LayerFinished {
                index: layer_index,
                id: layer.id.clone(),
                result: result.clone(),
            });
        }
        Ok(result)
    }
}

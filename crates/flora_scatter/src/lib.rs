#![forbid(unsafe_code)]
//! flora_scatter: Terrain analysis maps and curve-driven vegetation placement.
//!
//! Modules:
//! - analysis: mean height, relative height, slope and moisture rasters from a square heightfield
//! - sampling: candidate generation (Poisson disk)
//! - scatter: species, layers, plans, predominance selection, evaluator, runner, events
//! - curve: response curves shared by analysis and placement
//!
//! For examples, see the `flora_scatter_examples` crate.
pub mod analysis;
pub mod curve;
pub mod error;
pub mod sampling;
pub mod scatter;

/// Convenient re-exports for common types. Import with `use flora_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::analysis::mean_height::mean_height;
    pub use crate::analysis::moisture::moisture;
    pub use crate::analysis::relative_height::relative_height;
    pub use crate::analysis::slope::slope;
    pub use crate::analysis::{
        AnalysisConfig, AnalysisInputs, Grid, HeightGrid, MeanHeightResult, MoistureConfig,
        MoistureInputs, NeighborhoodCache, RelativeHeightOffset, RgbaTexture, SlopeResult,
        TerrainAnalysisPipeline, TerrainMaps, Texture, TextureChannel,
    };
    pub use crate::curve::{
        shared, ConstantCurve, Curve, CurveRef, Keyframe, KeyframeCurve, LinearCurve,
    };
    pub use crate::error::{Error, Result};
    pub use crate::sampling::{poisson_disk, PoissonDiskSampling, PositionSampling};
    pub use crate::scatter::evaluator::{
        CellSample, Evaluation, HeightSignal, PlacementDecision, PlacementEvaluator,
    };
    pub use crate::scatter::events::{
        EventSink, FnSink, PlacementEvent, PlacementEventKind, VecSink,
    };
    pub use crate::scatter::plan::{PlacementLayer, Plan};
    pub use crate::scatter::runner::{LayerFailure, RunConfig, RunResult, VegetationPlacer};
    pub use crate::scatter::selection::{
        pick_species, select_species, validate_predominance, PredominanceCheck, Selection,
    };
    pub use crate::scatter::world::{PlantInstance, VecWorld, WorldPlacement};
    pub use crate::scatter::{PlantSpecies, SpeciesHandle, SpeciesId};
}

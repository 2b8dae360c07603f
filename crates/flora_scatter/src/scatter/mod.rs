//! Vegetation placement across an analysed terrain.
//!
//! Layers of [`PlantSpecies`] are placed one after another: candidates come from a
//! Poisson disk run with the layer's radius, each candidate draws a species from the
//! layer's predominance table, and the species' response curves decide acceptance.
use std::fmt;

use crate::curve::{shared, ConstantCurve, CurveRef};

pub mod evaluator;
pub mod events;
pub mod plan;
pub mod runner;
pub mod selection;
pub mod world;

pub type SpeciesId = String;
/// Opaque reference to the mesh or prefab instantiated for a species.
pub type SpeciesHandle = String;

/// A plant that can be placed, with its response to the terrain rasters.
#[non_exhaustive]
#[derive(Clone)]
pub struct PlantSpecies {
    /// Unique identifier.
    pub id: SpeciesId,
    pub handle: SpeciesHandle,
    /// Nominal radius occupied by one plant, in grid units.
    pub zone_of_influence: f32,
    /// Response to terrain height.
    pub height: CurveRef,
    /// Response to normalized slope.
    pub slope: CurveRef,
    /// Response to moisture.
    pub moisture: CurveRef,
    /// Response to neighbouring plants. Carried for completeness; not consumed by the
    /// acceptance test.
    pub interaction: CurveRef,
}

impl PlantSpecies {
    /// Create a species that accepts every cell (all curves return `1.0`).
    pub fn new(
        id: impl Into<SpeciesId>,
        handle: impl Into<SpeciesHandle>,
        zone_of_influence: f32,
    ) -> Self {
        let one = shared(ConstantCurve::new(1.0));
        Self {
            id: id.into(),
            handle: handle.into(),
            zone_of_influence,
            height: one.clone(),
            slope: one.clone(),
            moisture: one.clone(),
            interaction: one,
        }
    }

    pub fn with_height_curve(mut self, curve: CurveRef) -> Self {
        self.height = curve;
        self
    }

    pub fn with_slope_curve(mut self, curve: CurveRef) -> Self {
        self.slope = curve;
        self
    }

    pub fn with_moisture_curve(mut self, curve: CurveRef) -> Self {
        self.moisture = curve;
        self
    }

    pub fn with_interaction_curve(mut self, curve: CurveRef) -> Self {
        self.interaction = curve;
        self
    }

    /// The four response curves in the order height, slope, moisture, interaction.
    pub fn curves(&self) -> [&CurveRef; 4] {
        [&self.height, &self.slope, &self.moisture, &self.interaction]
    }
}

impl fmt::Debug for PlantSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlantSpecies")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .field("zone_of_influence", &self.zone_of_influence)
            .finish_non_exhaustive()
    }
}

//! Placement layers and plans.
use crate::error::{Error, Result};
use crate::scatter::selection::{validate_predominance, PredominanceCheck};
use crate::scatter::PlantSpecies;

/// A group of species placed together with one minimum separation.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct PlacementLayer {
    /// Unique identifier for this layer.
    pub id: String,
    /// Species to choose from.
    pub species: Vec<PlantSpecies>,
    /// Ascending cumulative shares, one per species, ideally ending at `1.0`.
    pub predominance: Vec<f32>,
    /// Minimum distance between candidates of this layer, in grid units.
    pub radius: f32,
    /// Disabled layers are skipped by the runner.
    pub enabled: bool,
}

impl PlacementLayer {
    /// Create an enabled layer.
    pub fn new(
        id: impl Into<String>,
        species: Vec<PlantSpecies>,
        predominance: Vec<f32>,
        radius: f32,
    ) -> Self {
        Self {
            id: id.into(),
            species,
            predominance,
            radius,
            enabled: true,
        }
    }

    /// Create an enabled layer where every species gets the same share.
    pub fn with_equal_shares(
        id: impl Into<String>,
        species: Vec<PlantSpecies>,
        radius: f32,
    ) -> Self {
        let n = species.len();
        let predominance = (1..=n)
            .map(|i| if i == n { 1.0 } else { i as f32 / n as f32 })
            .collect();
        Self::new(id, species, predominance, radius)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the radius to the largest zone of influence among the layer's species.
    pub fn with_radius_from_species(mut self) -> Self {
        if let Some(max) = self
            .species
            .iter()
            .map(|s| s.zone_of_influence)
            .max_by(f32::total_cmp)
        {
            self.radius = max;
        }
        self
    }

    /// Ids of the layer's species in table order.
    pub fn species_ids(&self) -> Vec<String> {
        self.species.iter().map(|s| s.id.clone()).collect()
    }

    /// Structural checks; an incomplete predominance table is reported, not rejected.
    pub fn validate(&self) -> Result<PredominanceCheck> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::invalid_parameter(
                format!("layer:{}", self.id),
                format!("radius must be finite and > 0, got {}", self.radius),
            ));
        }
        validate_predominance(&self.predominance, self.species.len()).map_err(|e| match e {
            Error::InvalidParameter { context, message } => Error::InvalidParameter {
                context: format!("layer:{} {context}", self.id),
                message,
            },
            other => other,
        })
    }
}

/// An ordered list of [`PlacementLayer`]s.
#[derive(Default, Clone, Debug)]
#[non_exhaustive]
pub struct Plan {
    pub layers: Vec<PlacementLayer>,
}

impl Plan {
    /// Create a new empty plan.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a single layer to the plan.
    pub fn with_layer(mut self, layer: PlacementLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Add multiple layers to the plan.
    pub fn with_layers(mut self, layers: Vec<PlacementLayer>) -> Self {
        self.layers.extend(layers);
        self
    }
}

//! The collaborator that receives placed plants.
use crate::scatter::{SpeciesHandle, SpeciesId};

/// World-space parameters of one placed plant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantInstance {
    pub world_x: f32,
    /// Terrain surface height at the plant.
    pub height: f32,
    pub world_z: f32,
    /// Rotation about the vertical axis in radians, `[0, 2π)`.
    pub rotation: f32,
    pub handle: SpeciesHandle,
    pub species_id: SpeciesId,
    pub layer_id: String,
}

/// Receives plant instances from a placement run.
pub trait WorldPlacement {
    /// Removes every instance of a previous run.
    fn clear(&mut self);

    fn place(&mut self, instance: PlantInstance);
}

/// Discards everything.
impl WorldPlacement for () {
    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn place(&mut self, _instance: PlantInstance) {}
}

/// Collects instances in a `Vec`.
#[derive(Debug, Default, Clone)]
pub struct VecWorld {
    instances: Vec<PlantInstance>,
}

impl VecWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[PlantInstance] {
        &self.instances
    }

    pub fn into_inner(self) -> Vec<PlantInstance> {
        self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl WorldPlacement for VecWorld {
    fn clear(&mut self) {
        self.instances.clear();
    }

    fn place(&mut self, instance: PlantInstance) {
        self.instances.push(instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(x: f32) -> PlantInstance {
        PlantInstance {
            world_x: x,
            height: 0.0,
            world_z: 0.0,
            rotation: 0.0,
            handle: "meshes/fern".into(),
            species_id: "fern".into(),
            layer_id: "ground".into(),
        }
    }

    #[test]
    fn vec_world_collects_and_clears() {
        let mut world = VecWorld::new();
        world.place(instance(1.0));
        world.place(instance(2.0));
        assert_eq!(world.len(), 2);
        assert_eq!(world.instances()[1].world_x, 2.0);
        world.clear();
        assert!(world.is_empty());
    }
}

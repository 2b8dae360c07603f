use flora_scatter::prelude::*;
use tracing::debug;

/// A world that keeps placed plants and logs each one at debug level.
#[derive(Default)]
pub struct LoggingWorld {
    pub instances: Vec<PlantInstance>,
}

impl LoggingWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the instances as CSV.
    pub fn write_csv(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let mut out = String::from("layer,species,handle,x,height,z,rotation\n");
        for i in &self.instances {
            out.push_str(&format!(
                "{},{},{},{:.3},{:.3},{:.3},{:.4}\n",
                i.layer_id, i.species_id, i.handle, i.world_x, i.height, i.world_z, i.rotation
            ));
        }
        std::fs::write(path, out)?;
        Ok(())
    }
}

impl WorldPlacement for LoggingWorld {
    fn clear(&mut self) {
        self.instances.clear();
    }

    fn place(&mut self, instance: PlantInstance) {
        debug!(
            "{} '{}' at ({:.2}, {:.2}, {:.2})",
            instance.layer_id,
            instance.species_id,
            instance.world_x,
            instance.height,
            instance.world_z
        );
        self.instances.push(instance);
    }
}

#![forbid(unsafe_code)]

mod export;
mod terrain;
mod world;

pub use export::{render_placements, write_grid_image, write_maps, SpeciesStyle};
pub use terrain::{
    load_heightfield, load_texture, synthetic_heightfield, water_from_heights,
};
pub use world::LoggingWorld;

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

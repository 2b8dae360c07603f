use std::fs;

use flora_scatter::prelude::*;
use flora_scatter_examples::init_tracing;
use glam::Vec2;
use image::{ImageBuffer, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// Renders Poisson disk samples for several radii side by side.
fn main() -> anyhow::Result<()> {
    init_tracing();

    const PANEL: u32 = 200;
    const RADII: [f32; 4] = [16.0, 8.0, 4.0, 2.0];

    let domain = Vec2::splat(PANEL as f32);
    let mut img: RgbImage =
        ImageBuffer::from_pixel(PANEL * RADII.len() as u32, PANEL, Rgb([250, 248, 240]));

    for (i, &radius) in RADII.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(42);
        let points = poisson_disk(radius, domain, 30, &mut rng)?;
        info!("radius {radius}: {} points", points.len());
        let offset = i as u32 * PANEL;
        for p in points {
            img.put_pixel(offset + p.x as u32, p.y as u32, Rgb([20, 90, 40]));
        }
    }

    fs::create_dir_all("output")?;
    img.save("output/poisson_radii.png")?;
    Ok(())
}

use std::path::Path;

use anyhow::{bail, Context};
use flora_scatter::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Fractal Perlin heightfield stretched to `[0, 1]`.
pub fn synthetic_heightfield(size: usize, seed: u32) -> HeightGrid {
    let elevation: Fbm<Perlin> = Fbm::new(seed)
        .set_octaves(5)
        .set_frequency(4.0)
        .set_persistence(0.5);

    let grid = Grid::from_fn(size, |x, y| {
        let u = x as f64 / size.max(1) as f64;
        let v = y as f64 / size.max(1) as f64;
        elevation.get([u, v]) as f32
    });

    let (min, max) = grid.min_max().unwrap_or((0.0, 1.0));
    let span = (max - min).max(f32::EPSILON);
    grid.map(|&h| (h - min) / span)
}

/// A water texture: full water below `level`, with water spread (alpha) fading out over
/// `spread` above it.
pub fn water_from_heights(
    heights: &HeightGrid,
    level: f32,
    spread: f32,
) -> anyhow::Result<RgbaTexture> {
    let size = heights.size() as u32;
    let texels = heights
        .iter()
        .map(|&h| {
            let water = if h < level { 1.0 } else { 0.0 };
            let fade = if spread > 0.0 {
                (1.0 - (h - level) / spread).clamp(0.0, 1.0)
            } else {
                water
            };
            [water, 0.0, 0.0, fade * (1.0 - water) * 0.8]
        })
        .collect();
    Ok(RgbaTexture::new(size, size, texels)?)
}

/// Loads a PNG or JPEG as an RGBA texture.
pub fn load_texture(path: impl AsRef<Path>) -> anyhow::Result<RgbaTexture> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("loading texture {}", path.display()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    Ok(RgbaTexture::from_rgba8(w, h, img.as_raw())?)
}

/// Loads a square grayscale PNG or JPEG as a heightfield in `[0, 1]`.
pub fn load_heightfield(path: impl AsRef<Path>) -> anyhow::Result<HeightGrid> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("loading heightfield {}", path.display()))?
        .to_luma16();
    let (w, h) = img.dimensions();
    if w != h {
        bail!("heightfield {} must be square, got {w}x{h}", path.display());
    }
    let data = img.pixels().map(|p| p.0[0] as f32 / u16::MAX as f32).collect();
    Ok(Grid::from_vec(w as usize, data)?)
}

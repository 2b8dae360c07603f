use std::fs;
use std::path::Path;

use anyhow::bail;
use flora_scatter::prelude::*;
use image::{GrayImage, ImageBuffer, ImageFormat, Luma, Rgb, RgbImage};
use tracing::info;

/// Writes `grid` as an 8-bit grayscale image; values are clamped to `[0, 1]` and NaN is
/// black. The format follows the file extension (`.png`, `.jpg` or `.jpeg`).
pub fn write_grid_image(grid: &Grid<f32>, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let size = grid.size() as u32;
    let img: GrayImage = ImageBuffer::from_fn(size, size, |x, y| {
        let v = grid.get(x as usize, y as usize).copied().unwrap_or(0.0);
        Luma([to_u8(v)])
    });
    img.save(path.as_ref())?;
    info!("Wrote {}", path.as_ref().display());
    Ok(())
}

/// Writes every map of `maps` as `<dir>/<name>.<ext>` in `format` (PNG or JPEG).
pub fn write_maps(
    maps: &TerrainMaps,
    dir: impl AsRef<Path>,
    format: ImageFormat,
) -> anyhow::Result<()> {
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        bail!("maps are exported as PNG or JPEG, not {format:?}");
    }
    let ext = format.extensions_str().first().copied().unwrap_or("png");
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    for (name, grid) in maps.named() {
        write_grid_image(grid, dir.join(format!("{name}.{ext}")))?;
    }
    Ok(())
}

/// Dot colour and size for one species in the placement overview.
#[derive(Clone, Debug)]
pub struct SpeciesStyle {
    pub species_id: String,
    pub color: [u8; 3],
    pub radius_px: i32,
}

impl SpeciesStyle {
    pub fn new(species_id: impl Into<String>, color: [u8; 3], radius_px: i32) -> Self {
        Self {
            species_id: species_id.into(),
            color,
            radius_px,
        }
    }
}

/// Draws accepted decisions as dots over the grayscale heightfield, scaled by `scale`.
/// The format follows the file extension.
pub fn render_placements(
    maps: &TerrainMaps,
    plan: &Plan,
    result: &RunResult,
    styles: &[SpeciesStyle],
    scale: u32,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let scale = scale.max(1);
    let size = maps.size() as u32 * scale;
    let mut img: RgbImage = ImageBuffer::from_fn(size, size, |x, y| {
        let h = maps
            .heights
            .get((x / scale) as usize, (y / scale) as usize)
            .copied()
            .unwrap_or(0.0);
        let g = to_u8(h) / 2 + 40;
        Rgb([g, g, g])
    });

    for decision in result.decisions.iter().filter(|d| d.accepted) {
        let Some(species) = plan
            .layers
            .get(decision.layer_index)
            .and_then(|l| l.species.get(decision.species_index))
        else {
            continue;
        };
        let style = styles.iter().find(|s| s.species_id == species.id);
        let (color, radius) = style.map_or(([255, 255, 255], 1), |s| (s.color, s.radius_px));
        let cx = (decision.point.x * scale as f32) as i32;
        let cy = (decision.point.y * scale as f32) as i32;
        draw_disk(&mut img, cx, cy, radius, color);
    }

    img.save(path.as_ref())?;
    info!(
        "Wrote {} ({} plants)",
        path.as_ref().display(),
        result.placed()
    );
    Ok(())
}

fn draw_disk(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && x < w && y < h {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

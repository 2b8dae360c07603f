//! Externally supplied input rasters.
//!
//! Water and water-spread maps are pre-rendered images. This module defines how they plug
//! into the analysis pipeline:
//! - Implement [`Texture`] for a custom image source, or use [`RgbaTexture`].
//! - Pick which [`TextureChannel`] holds the signal.
//! - Resample into a [`Grid`] with [`read_channel`].
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::grid::Grid;
use crate::error::Result;

/// Texture channel to sample from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureChannel {
    R,
    G,
    B,
    A,
}

impl TextureChannel {
    #[inline]
    fn offset(self) -> usize {
        match self {
            TextureChannel::R => 0,
            TextureChannel::G => 1,
            TextureChannel::B => 2,
            TextureChannel::A => 3,
        }
    }
}

/// Trait for 2D textures sampled at normalized coordinates `uv` in `[0, 1]²`.
/// `u` runs along grid columns (`x`), `v` along grid rows (`y`).
pub trait Texture: Send + Sync {
    fn sample(&self, channel: TextureChannel, uv: Vec2) -> f32;

    /// Native resolution `(width, height)` in texels, when known.
    fn resolution(&self) -> Option<(u32, u32)> {
        None
    }
}

/// In-memory RGBA texture with row-major texels in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct RgbaTexture {
    width: u32,
    height: u32,
    texels: Vec<[f32; 4]>,
}

impl RgbaTexture {
    /// Create a texture from row-major RGBA texels.
    pub fn new(width: u32, height: u32, texels: Vec<[f32; 4]>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(crate::error::Error::invalid_parameter(
                "texture",
                format!(
                    "expected {expected} texels for {width}x{height}, got {}",
                    texels.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Create a texture from 8-bit RGBA bytes (4 bytes per texel).
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let texels = bytes
            .chunks_exact(4)
            .map(|px| {
                [
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                    px[3] as f32 / 255.0,
                ]
            })
            .collect();
        Self::new(width, height, texels)
    }

    /// Create a texture storing `grid` in one channel; the other channels are zero
    /// except alpha, which is one unless it is the target channel.
    pub fn from_grid(grid: &Grid<f32>, channel: TextureChannel) -> Self {
        let size = grid.size() as u32;
        let texels = grid
            .iter()
            .map(|&v| {
                let mut px = [0.0, 0.0, 0.0, 1.0];
                px[channel.offset()] = v;
                px
            })
            .collect();
        Self {
            width: size,
            height: size,
            texels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel value at integer coordinates, clamped into the texture.
    pub fn texel(&self, x: u32, y: u32, channel: TextureChannel) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.texels[y * self.width as usize + x][channel.offset()]
    }
}

impl Texture for RgbaTexture {
    fn sample(&self, channel: TextureChannel, uv: Vec2) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.texel(x, y, channel)
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }
}

/// Resample one channel of `texture` onto a `size × size` grid at cell centers.
///
/// Textures are expected to match the grid resolution; a mismatch is logged and the
/// texture is rescaled by nearest lookup.
pub fn read_channel(
    texture: &dyn Texture,
    channel: TextureChannel,
    size: usize,
    name: &str,
) -> Grid<f32> {
    if let Some((w, h)) = texture.resolution() {
        if w as usize != size || h as usize != size {
            warn!(
                "Input raster '{}' is {}x{} but the heightfield is {}x{}; rescaling.",
                name, w, h, size, size
            );
        }
    }
    let inv = 1.0 / size.max(1) as f32;
    Grid::from_fn(size, |x, y| {
        let uv = Vec2::new((x as f32 + 0.5) * inv, (y as f32 + 0.5) * inv);
        texture.sample(channel, uv)
    })
}

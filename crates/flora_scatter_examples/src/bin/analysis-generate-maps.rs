use flora_scatter::prelude::*;
use flora_scatter_examples::{
    init_tracing, load_heightfield, synthetic_heightfield, water_from_heights, write_maps,
};
use image::ImageFormat;

/// Builds all terrain maps for a heightfield and writes them as images.
///
/// Usage: `analysis-generate-maps [heightfield.png|-] [png|jpg]`. Without a heightfield
/// (or with `-`) a synthetic 256x256 one is used; maps are written as PNG by default.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let heights = match args.next().filter(|a| a != "-") {
        Some(path) => load_heightfield(path)?,
        None => synthetic_heightfield(256, 7),
    };
    let format = match args.next() {
        Some(ext) => ImageFormat::from_extension(&ext)
            .ok_or_else(|| anyhow::anyhow!("unknown image format '{ext}'"))?,
        None => ImageFormat::Png,
    };
    let water = water_from_heights(&heights, 0.25, 0.15)?;

    let config = AnalysisConfig::default()
        .with_circle_sampler_radius(3.0)
        .with_slope_sample_distance(1)
        .with_moisture(
            MoistureConfig::default()
                .with_weights(0.8, 1.2, 1.0)
                .with_omega(0.4)
                // Valleys hold water, ridges dry out.
                .with_height_curve(shared(LinearCurve::new(-0.6, 0.8))),
        );

    let pipeline = TerrainAnalysisPipeline::new(config)?;
    let inputs = AnalysisInputs::new(heights)
        .with_water(water.clone())
        .with_water_spread(water);
    let maps = pipeline.run(&inputs)?;

    write_maps(&maps, "output/maps", format)?;
    Ok(())
}

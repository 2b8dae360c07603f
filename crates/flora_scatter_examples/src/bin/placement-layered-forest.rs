use std::fs;

use flora_scatter::prelude::*;
use flora_scatter_examples::{
    init_tracing, render_placements, synthetic_heightfield, water_from_heights, LoggingWorld,
    SpeciesStyle,
};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Three layers (trees, shrubs, ground cover) placed on a synthetic terrain.
fn main() -> anyhow::Result<()> {
    init_tracing();

    let heights = synthetic_heightfield(256, 11);
    let water = water_from_heights(&heights, 0.2, 0.1)?;
    let maps = TerrainAnalysisPipeline::new(AnalysisConfig::default())?.run(
        &AnalysisInputs::new(heights)
            .with_water(water.clone())
            .with_water_spread(water),
    )?;

    let plan = Plan::new().with_layers(vec![trees(), shrubs(), ground_cover()]);

    let config = RunConfig::new(Vec3::new(512.0, 80.0, 512.0))
        .with_terrain_origin(Vec3::new(-256.0, 0.0, -256.0))
        .with_threshold(0.35)
        .with_max_attempts_per_point(30);
    let placer = VegetationPlacer::try_new(config, &maps)?;

    let mut warnings = 0usize;
    let mut sink = FnSink::new(|event| {
        if let PlacementEvent::Warning { .. } = event {
            warnings += 1;
        }
    });
    let mut world = LoggingWorld::new();
    let mut rng = StdRng::seed_from_u64(42);
    let result = placer.run_with_events(&plan, &mut rng, &mut world, &mut sink);
    tracing::info!(
        "{} plants, {} rejected, {} warnings",
        result.placed(),
        result.candidates_rejected,
        warnings
    );

    fs::create_dir_all("output")?;
    world.write_csv("output/forest.csv")?;
    render_placements(
        &maps,
        &plan,
        &result,
        &[
            SpeciesStyle::new("oak", [30, 110, 40], 5),
            SpeciesStyle::new("pine", [20, 70, 50], 4),
            SpeciesStyle::new("hazel", [120, 160, 60], 2),
            SpeciesStyle::new("fern", [90, 200, 90], 1),
            SpeciesStyle::new("heather", [170, 90, 160], 1),
        ],
        4,
        "output/forest.png",
    )?;
    Ok(())
}

fn trees() -> PlacementLayer {
    let oak = PlantSpecies::new("oak", "meshes/oak", 8.0)
        .with_height_curve(shared(KeyframeCurve::from_pairs(&[
            (0.2, 0.0),
            (0.35, 1.0),
            (0.6, 1.0),
            (0.75, 0.0),
        ])))
        .with_slope_curve(shared(KeyframeCurve::from_pairs(&[(0.0, 1.0), (0.5, 0.0)])))
        .with_moisture_curve(shared(LinearCurve::new(0.5, 0.5)));
    let pine = PlantSpecies::new("pine", "meshes/pine", 6.0)
        .with_height_curve(shared(KeyframeCurve::from_pairs(&[(0.45, 0.0), (0.7, 1.0)])))
        .with_slope_curve(shared(KeyframeCurve::from_pairs(&[(0.0, 1.0), (0.7, 0.2)])));
    PlacementLayer::new("trees", vec![oak, pine], vec![0.6, 1.0], 0.0).with_radius_from_species()
}

fn shrubs() -> PlacementLayer {
    let hazel = PlantSpecies::new("hazel", "meshes/hazel", 3.0)
        .with_moisture_curve(shared(KeyframeCurve::from_pairs(&[(0.2, 0.0), (0.6, 1.0)])));
    PlacementLayer::with_equal_shares("shrubs", vec![hazel], 3.0)
}

fn ground_cover() -> PlacementLayer {
    let fern = PlantSpecies::new("fern", "meshes/fern", 1.5)
        .with_moisture_curve(shared(LinearCurve::identity()));
    let heather = PlantSpecies::new("heather", "meshes/heather", 1.5)
        .with_moisture_curve(shared(|m: f32| (1.0 - m).clamp(0.0, 1.0)));
    PlacementLayer::new("ground", vec![fern, heather], vec![0.5, 1.0], 1.5)
}

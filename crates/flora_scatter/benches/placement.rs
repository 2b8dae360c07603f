mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use flora_scatter::analysis::{AnalysisConfig, AnalysisInputs, TerrainAnalysisPipeline};
use flora_scatter::curve::{shared, KeyframeCurve, LinearCurve};
use flora_scatter::scatter::plan::{PlacementLayer, Plan};
use flora_scatter::scatter::runner::{RunConfig, VegetationPlacer};
use flora_scatter::scatter::PlantSpecies;
use rand::rngs::StdRng;
use rand::SeedableRng;

const RADII: [f32; 4] = [8.0, 4.0, 2.0, 1.0];

fn layer(radius: f32) -> PlacementLayer {
    let grass = PlantSpecies::new("grass", "meshes/grass", radius)
        .with_slope_curve(shared(KeyframeCurve::from_pairs(&[(0.0, 1.0), (0.6, 0.0)])));
    let fern = PlantSpecies::new("fern", "meshes/fern", radius)
        .with_moisture_curve(shared(LinearCurve::identity()));
    PlacementLayer::new("ground", vec![grass, fern], vec![0.7, 1.0], radius)
}

fn placement_benches(c: &mut Criterion) {
    let maps = TerrainAnalysisPipeline::new(AnalysisConfig::default())
        .and_then(|p| p.run(&AnalysisInputs::new(common::hills(256))))
        .expect("analysis ok");
    let placer = VegetationPlacer::try_new(RunConfig::default(), &maps).expect("maps ok");

    let mut group = c.benchmark_group("placement/run/256");
    for &radius in &RADII {
        let plan = Plan::new().with_layer(layer(radius));
        let expected = placer
            .run(&plan, &mut StdRng::seed_from_u64(0xF10A), &mut ())
            .candidates_evaluated;
        group.throughput(common::elements_throughput(expected));

        let mut rng = StdRng::seed_from_u64(0xF10A ^ radius as u64);
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
            b.iter(|| {
                let result = placer.run(black_box(&plan), &mut rng, &mut ());
                black_box(result.placed());
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = placement_benches
}
criterion_main!(benches);

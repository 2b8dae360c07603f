mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use flora_scatter::sampling::poisson_disk::PoissonDiskSampling;
use flora_scatter::sampling::PositionSampling;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

const RADII: [f32; 6] = [64.0, 32.0, 16.0, 8.0, 4.0, 2.0];
const ATTEMPTS: [usize; 3] = [10, 30, 60];

fn sampling_poisson_benches(c: &mut Criterion) {
    let extent = Vec2::new(1024.0, 1024.0);

    for &attempts in &ATTEMPTS {
        let mut group = c.benchmark_group(format!("sampling/poisson_disk/attempts_{attempts}"));

        for &radius in &RADII {
            let strategy = PoissonDiskSampling::new(radius).with_max_attempts(attempts);
            let mut rng_est = StdRng::seed_from_u64(0xBEEFu64 ^ (radius as u64));
            let expected = strategy
                .generate(extent.into(), &mut rng_est)
                .map_or(0, |pts| pts.len());
            group.throughput(common::elements_throughput(expected));

            let mut rng = StdRng::seed_from_u64(0xC0FFEEu64 ^ (radius as u64));

            group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, _| {
                b.iter(|| {
                    let pts = strategy.generate(extent.into(), &mut rng);
                    black_box(pts.map_or(0, |p| p.len()));
                });
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = sampling_poisson_benches
}
criterion_main!(benches);

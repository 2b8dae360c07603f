#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use flora_scatter::analysis::{Grid, HeightGrid};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Rolling hills in `[0, 1]`.
pub fn hills(size: usize) -> HeightGrid {
    let f = std::f32::consts::TAU / size.max(1) as f32;
    Grid::from_fn(size, |x, y| {
        let v = (x as f32 * f * 2.0).sin() * (y as f32 * f * 3.0).cos();
        0.5 + 0.5 * v
    })
}

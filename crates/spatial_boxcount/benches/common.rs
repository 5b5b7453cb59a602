use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_boxcount::grid::Grid;

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

/// Uniformly random 8-bit grid.
pub fn random_grid(side: usize, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..side * side).map(|_| rng.next_u32() % 256).collect();
    Grid::from_vec(side, side, Grid::DEFAULT_MAX_VALUE, data).expect("valid grid")
}

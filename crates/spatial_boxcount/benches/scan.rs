mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use spatial_boxcount::scan::{scan, scan_all_scales, Parallelism, ScanConfig, ScheduleConfig};

const GRID_SIDES: [usize; 3] = [128, 512, 1024];

fn single_scale_benches(c: &mut Criterion) {
    let grid = common::random_grid(512, 0x5CA9);
    let config = ScanConfig::default();
    let mut group = c.benchmark_group("scan/single_scale");
    group.throughput(common::elements_throughput(512 * 512));

    for scale_index in 0..5 {
        group.bench_with_input(
            BenchmarkId::from_parameter(scale_index),
            &scale_index,
            |b, &index| {
                b.iter(|| black_box(scan(&grid, index, &config).expect("scan").tiles_evaluated));
            },
        );
    }

    group.finish();
}

fn multi_scale_benches(c: &mut Criterion) {
    for (label, parallelism) in [
        ("per_scale", Parallelism::PerScale),
        ("sequential", Parallelism::Sequential),
    ] {
        let config = ScheduleConfig::default().with_parallelism(parallelism);
        let mut group = c.benchmark_group(format!("scan/all_scales/{label}"));

        for &side in &GRID_SIDES {
            let grid = common::random_grid(side, 0xA11 ^ side as u64);
            group.throughput(common::elements_throughput(side * side));
            group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
                b.iter(|| {
                    let maps = scan_all_scales(&grid, &config, &mut ()).expect("scan");
                    black_box(maps.len());
                });
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = single_scale_benches, multi_scale_benches
}
criterion_main!(benches);

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use connection_scan::sweep::sweep;
use dev_utils::{baseline_scenario, synthetic_scenario};

fn baseline_benchmark(c: &mut Criterion) {
    let (timetable, params) = baseline_scenario();
    c.bench_function("sweep/baseline", |b| b.iter(|| sweep(black_box(&timetable), black_box(&params), None)));
}

fn synthetic_benchmark(c: &mut Criterion) {
    let (timetable, params) = synthetic_scenario(200, 20, 7);
    c.bench_function("sweep/synthetic_200x20", |b| b.iter(|| sweep(black_box(&timetable), black_box(&params), None)));
}

criterion_group!(benches, baseline_benchmark, synthetic_benchmark);
criterion_main!(benches);

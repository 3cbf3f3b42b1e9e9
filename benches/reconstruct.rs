use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use dev_utils::synthetic_scenario;

/// Stresses the reconstruction walk specifically: a wider `journeys_per_stop` keeps more
/// competing pointers alive per stop, so `reconstruct::find_resulting_paths`'s alternative-exit
/// scan has more branches to explore than the plain `sweep` benchmark exercises.
fn reconstruction_heavy_benchmark(c: &mut Criterion) {
    let (timetable, mut params) = synthetic_scenario(80, 15, 11);
    params.journeys_per_stop = 6;
    params.journeys_to_find = usize::MAX;
    params.max_segments = 8;

    c.bench_function("reconstruct/journeys_per_stop_6", |b| {
        b.iter(|| connection_scan::query(black_box(&timetable), black_box(&params), None))
    });
}

criterion_group!(benches, reconstruction_heavy_benchmark);
criterion_main!(benches);

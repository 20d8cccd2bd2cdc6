use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use vitrine_test_scenes::{band_field, circular_pointer_trace};

fn field_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_update");

    group.bench_function("idle_frame", |b| {
        let mut engine = band_field();
        let mut now = Instant::now();
        b.iter(|| {
            engine.update(now);
            now += Duration::from_millis(16);
        });
    });

    group.bench_function("pointer_sweep_frame", |b| {
        let mut engine = band_field();
        let trace = circular_pointer_trace((960.0, 400.0), 200.0, 240);
        let mut step = 0usize;
        let mut now = Instant::now();
        b.iter(|| {
            engine.pointer_moved(trace[step % trace.len()], now);
            engine.update(now);
            step += 1;
            now += Duration::from_millis(16);
        });
    });

    group.bench_function("draw_list", |b| {
        let engine = band_field();
        b.iter(|| engine.draw_list());
    });

    group.finish();
}

criterion_group!(benches, field_update_benchmark);
criterion_main!(benches);

//! Benchmarks for rowwatch-diff.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rowwatch_core::{Row, TabularSnapshot, Value};
use rowwatch_diff::diff;

fn make_row(id: i64) -> Row {
    Row::new(vec![
        Value::Int64(id),
        Value::String(format!("name-{}", id)),
        Value::Float64(id as f64 * 0.5),
    ])
}

fn make_snapshot(size: i64) -> TabularSnapshot {
    TabularSnapshot::from_rows((0..size).map(make_row).collect())
}

fn bench_diff_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_unchanged");

    for size in [100, 1_000, 10_000] {
        let older = make_snapshot(size);
        let newer = make_snapshot(size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| diff(black_box(&older), black_box(&newer)))
        });
    }

    group.finish();
}

fn bench_diff_appended(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_appended_10pct");

    for size in [100, 1_000, 10_000] {
        let older = make_snapshot(size);
        let newer = make_snapshot(size + size / 10);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| diff(black_box(&older), black_box(&newer)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff_unchanged, bench_diff_appended);
criterion_main!(benches);

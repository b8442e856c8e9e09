//! Benchmarks for constraint aggregation

use bestplace_algorithms::constraint::{aggregate, AggregateParams};
use bestplace_algorithms::vector::{buffer_points, union_all, BufferParams};
use bestplace_core::{ConstraintRecord, ConstraintSet, CRS};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::{LineString, MultiPolygon, Point, Polygon};

const NAMES: [&str; 4] = ["big_park", "daycare", "sea", "upper_school"];

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Polygon::new(
        LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        vec![],
    )])
}

/// Circles and rectangles scattered over a grid, cycling through the names
fn create_test_set(count: usize) -> ConstraintSet {
    let params = BufferParams { distance: 500.0, segments: 32 };
    let mut set = ConstraintSet::new(CRS::etrs_gk25());
    for i in 0..count {
        let x = ((i * 37) % 100) as f64 * 200.0;
        let y = ((i * 53) % 100) as f64 * 200.0;
        let geometry = if i % 2 == 0 {
            MultiPolygon::new(vec![buffer_points(&Point::new(x, y), &params)])
        } else {
            rect(x - 400.0, y - 400.0, x + 400.0, y + 400.0)
        };
        set.push(ConstraintRecord::new(NAMES[i % NAMES.len()], geometry));
    }
    set
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("constraint/aggregate");
    for count in [16, 64, 256, 1024] {
        let set = create_test_set(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| aggregate(black_box(&set), AggregateParams::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_aggregate_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("constraint/aggregate_sequential");
    let params = AggregateParams { parallel_union: false, ..AggregateParams::default() };
    for count in [16, 64, 256, 1024] {
        let set = create_test_set(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| aggregate(black_box(&set), params.clone()).unwrap())
        });
    }
    group.finish();
}

fn bench_union_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector/union_all");
    for count in [16, 64, 256] {
        let set = create_test_set(count);
        let shapes: Vec<&MultiPolygon<f64>> =
            set.records.iter().filter_map(|r| r.geometry.as_ref()).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| union_all(black_box(shapes.iter().copied())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_aggregate_sequential, bench_union_all);
criterion_main!(benches);

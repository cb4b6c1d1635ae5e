//! Criterion benchmarks for hull merging.
//!
//! - Pairwise union of overlapping regular polygons (8–256 vertices).
//! - `merge_all` over the leaf hulls of a synthetic constellation.
//! - Gated leaf assembly for one synthetic class.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use constellation::geom::{BareHull, Pt2};
use constellation::merge::{
    assemble_leaf_hulls, leaf_hulls, merge, merge_all, subdivide, GateCfg, SubdivideCfg,
    TestPoints,
};
use constellation::synth::{generate, regular_polygon, ReplayToken, SynthCfg};

fn bench_pairwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_pair");
    for &n in &[8usize, 32, 128, 256] {
        let Ok(a) = BareHull::from_ring(regular_polygon(n, 1.0, Pt2::new(0.0, 0.0))) else {
            continue;
        };
        let Ok(b) = BareHull::from_ring(regular_polygon(n, 1.0, Pt2::new(0.7, 0.31))) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("regular_ngons", n), &(a, b), |bch, (a, b)| {
            bch.iter(|| merge(a, b))
        });
    }
    group.finish();
}

fn synthetic_leaves(seed: u64) -> (Vec<BareHull>, Vec<Pt2>, Vec<bool>) {
    let data = generate(&SynthCfg::default(), ReplayToken::new(seed, 0));
    let cfg = SubdivideCfg {
        max_points: 40,
        min_points: 5,
    };
    let mut hulls = Vec::new();
    let mut all = Vec::new();
    let mut member = Vec::new();
    for cell in &data.cells {
        all.push(cell.point());
        member.push(cell.labels[0] == "C0");
    }
    let class_points = data.points_of(0, "C0");
    hulls.extend(leaf_hulls(&subdivide(&class_points, &cfg)));
    (hulls, all, member)
}

fn bench_merge_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_all");
    let (hulls, all, member) = synthetic_leaves(7);
    group.bench_function("synthetic_class_leaves", |b| {
        b.iter_batched(|| hulls.clone(), merge_all, BatchSize::SmallInput)
    });
    if let Some(test) = TestPoints::select(&all, &member, GateCfg::default().slop) {
        let gate = GateCfg::default();
        group.bench_function("gated_assembly", |b| {
            b.iter_batched(
                || hulls.clone(),
                |hs| assemble_leaf_hulls(hs, &test, &gate),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pairwise, bench_merge_all);
criterion_main!(benches);

//! Criterion benchmarks for the feature matcher.
//! Focus sizes: m baseline features in {10, 50, 200} against as many candidates.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use geo::{Geometry, LineString};
use geojson::Feature;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shoreline::adapter;
use shoreline::matcher::{match_features, CandidatePool};

fn random_segment(rng: &mut StdRng) -> LineString<f64> {
    let x: f64 = rng.gen_range(0.0..1000.0);
    let y: f64 = rng.gen_range(0.0..1000.0);
    let theta: f64 = rng.gen::<f64>() * std::f64::consts::TAU;
    let len = rng.gen_range(5.0..50.0);
    LineString::from(vec![(x, y), (x + len * theta.cos(), y + len * theta.sin())])
}

fn inputs(m: usize, seed: u64) -> (Vec<Feature>, CandidatePool) {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = (0..m)
        .map(|_| Feature {
            bbox: None,
            geometry: Some(adapter::from_geo(&Geometry::LineString(random_segment(&mut rng)))),
            id: None,
            properties: None,
            foreign_members: None,
        })
        .collect();
    let pool = CandidatePool::new((0..m).map(|_| random_segment(&mut rng)));
    (features, pool)
}

fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match");
    for &m in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::new("match_features", m), &m, |b, &m| {
            b.iter_batched(
                || inputs(m, 7),
                |(features, pool)| {
                    let _out = match_features(&features, pool).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_match);
criterion_main!(benches);

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rate_bench::analysis::rank;
use rate_bench::statistics::{OnlineStats, Stats};
use rate_bench::Sample;

fn samples(n: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| Sample::new(Duration::from_nanos(rng.random_range(900..1_100)), 64))
        .collect()
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");
    for n in [100usize, 10_000] {
        let data = samples(n);
        group.bench_with_input(BenchmarkId::new("from_samples", n), &data, |b, data| {
            b.iter(|| black_box(Stats::from_samples(data)));
        });
        group.bench_with_input(BenchmarkId::new("online", n), &data, |b, data| {
            b.iter(|| {
                let mut online = OnlineStats::new();
                data.iter().for_each(|s| online.push(s));
                black_box(online.margin_of_error_pct())
            });
        });
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let entries: Vec<(String, Stats)> = (0..32)
        .map(|i| {
            let mean = rng.random_range(1_000.0..2_000.0);
            (format!("candidate-{i}"), Stats::from_moments(50, mean, 400.0))
        })
        .collect();

    c.bench_function("rank_32", |b| {
        b.iter(|| black_box(rank(entries.clone())));
    });
}

criterion_group!(benches, bench_summary, bench_rank);
criterion_main!(benches);

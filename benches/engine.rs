use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quotawatch::data::quota::{assess, evaluate};
use quotawatch::data::ranking::{rank, top_n};
use quotawatch::data::size::parse_size;
use quotawatch::data::{Limits, Policy, PolicyBook};
use quotawatch::Consumer;

fn consumers(count: usize) -> Vec<Consumer> {
    (0..count)
        .map(|i| Consumer::new(format!("user{:05}", i), ((i as u64 * 7_919) % 1_000_003) << 10))
        .collect()
}

/// Size strings as the backend reports them
fn bench_parse_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_size");
    for input in ["512", "100G", "1.5T", "750M", "bogus"] {
        group.bench_with_input(BenchmarkId::from_parameter(input), &input, |b, input| {
            b.iter(|| parse_size(black_box(input)));
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    c.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(850.0), black_box(500.0), black_box(1000.0)));
    });
}

fn bench_assess(c: &mut Criterion) {
    let consumer = Consumer::new("alice", 850 << 20);
    let limits = Limits::new(500 << 20, 1000 << 20).ok();

    c.bench_function("assess", |b| {
        b.iter(|| assess(black_box(&consumer), black_box(limits)));
    });
}

/// Ranking cost as the consumer population grows
fn bench_top_n(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_n");
    for count in [100usize, 1_000, 10_000].iter() {
        let population = consumers(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &population, |b, pop| {
            b.iter(|| top_n(black_box(pop), 10).count());
        });
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let population = consumers(1_000);
    c.bench_function("rank_1000_top_10", |b| {
        b.iter(|| rank(black_box(&population), 10));
    });
}

fn bench_effective_limits(c: &mut Criterion) {
    let policies = (0..50)
        .map(|i| Policy {
            id: i,
            name: format!("policy-{}", i),
            soft_limit: (i + 1) << 30,
            hard_limit: (i + 2) << 30,
            is_default: i == 0,
            description: None,
        })
        .collect();
    let Ok(book) = PolicyBook::from_policies(policies) else {
        return;
    };
    let consumer = Consumer::new("bob", 1 << 30);

    c.bench_function("effective_limits_default", |b| {
        b.iter(|| book.effective_limits(black_box(&consumer)));
    });
}

criterion_group!(
    benches,
    bench_parse_size,
    bench_evaluate,
    bench_assess,
    bench_top_n,
    bench_rank,
    bench_effective_limits,
);

criterion_main!(benches);

// Copyright 2025 Cowboy AI, LLC.

//! Benchmarks for the hot pure paths: canonicalization and aggregation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fundsync::{canonicalize, compute_aggregates, CanonicalInvestment, InvestmentStatus};
use rand::{rngs::StdRng, Rng, SeedableRng};

const STATUSES: &[InvestmentStatus] = &[
    InvestmentStatus::Pending,
    InvestmentStatus::PendingContract,
    InvestmentStatus::Signing,
    InvestmentStatus::Signed,
    InvestmentStatus::Active,
    InvestmentStatus::Completed,
    InvestmentStatus::Rejected,
    InvestmentStatus::Cancelled,
];

fn investment_set(count: usize) -> Vec<CanonicalInvestment> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|i| CanonicalInvestment {
            id: format!("inv-{i}"),
            investor_uid: Some(format!("u{}", rng.gen_range(0..count / 4 + 1))),
            amount: rng.gen_range(100.0..250_000.0),
            status: STATUSES[rng.gen_range(0..STATUSES.len())],
        })
        .collect()
}

fn bench_compute_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_aggregates");
    for count in [100, 1_000, 10_000] {
        let investments = investment_set(count);
        group.bench_function(format!("{count}_investments"), |b| {
            b.iter(|| compute_aggregates(black_box(&investments)));
        });
    }
    group.finish();
}

fn bench_canonicalize(c: &mut Criterion) {
    let raw_values = [
        "signed",
        "approved",
        "pending_review",
        "  ACTIVE  ",
        "in_escrow",
    ];
    c.bench_function("canonicalize_mixed", |b| {
        b.iter(|| {
            for raw in raw_values {
                black_box(canonicalize(black_box(Some(raw)), false));
            }
        });
    });
}

criterion_group!(benches, bench_compute_aggregates, bench_canonicalize);
criterion_main!(benches);

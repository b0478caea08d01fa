//! Benchmarks for codeowners-gate-core
//!
//! Run with: cargo bench -p codeowners-gate-core
//!
//! Filter benchmarks:
//!   cargo bench -- "parsing"
//!   cargo bench -- "evaluate"

use codeowners_gate_core::gate::{FnTeamResolver, GateConfig, evaluate, extract_approvals};
use codeowners_gate_core::parse::parse_ownership;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use fixtures::{fixtures, reviews, team_members};

/// Benchmark parsing across all fixture sizes
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for (name, content) in fixtures() {
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_ownership", name),
            content,
            |b, input| b.iter(|| parse_ownership(std::hint::black_box(input))),
        );
    }
    group.finish();
}

/// Benchmark approval extraction over long review histories
fn bench_approvals(c: &mut Criterion) {
    let mut group = c.benchmark_group("approvals");

    for users in [10, 100, 1_000] {
        let history = reviews(users);
        group.throughput(Throughput::Elements(history.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("extract_approvals", users),
            &history,
            |b, history| b.iter(|| extract_approvals(std::hint::black_box(history))),
        );
    }
    group.finish();
}

/// Benchmark a full evaluation with in-memory team resolution
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let resolver = FnTeamResolver::new(|_org, team| Ok(team_members(team)));
    let history = reviews(100);
    let config = GateConfig::new();

    for (name, content) in fixtures() {
        group.bench_with_input(BenchmarkId::new("evaluate", name), content, |b, input| {
            b.iter(|| {
                tokio_test::block_on(evaluate(
                    std::hint::black_box(input),
                    &history,
                    &config,
                    &resolver,
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parsing, bench_approvals, bench_evaluate);
criterion_main!(benches);

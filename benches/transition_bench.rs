use criterion::{criterion_group, criterion_main, Criterion};
use mechorder::config::SearchParams;
use mechorder::heuristic::{transition_cost, TransitionMatrix};
use mechorder::mapping::ReferenceSets;
use mechorder::solver::{Backend, ScheduleBackend, SolveLimits};
use std::hint::black_box;
use std::time::Duration;

/// Banded sets resembling a chain mechanism: each index touches a small
/// window of neighbours plus a few shared radicals.
fn setup_sets(n: usize) -> ReferenceSets {
    (0..n)
        .map(|i| {
            let mut s: std::collections::BTreeSet<usize> = (i..i + 4).collect();
            s.insert(i % 7);
            s.insert(n + (i * 31) % 11);
            s
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let sets = setup_sets(300);
    let order: Vec<usize> = (0..sets.len()).rev().collect();

    c.bench_function("transition_cost (300 sets)", |b| {
        b.iter(|| transition_cost(black_box(&sets), black_box(&order)))
    });

    c.bench_function("matrix_build (300 sets)", |b| {
        b.iter(|| TransitionMatrix::build(black_box(&sets)))
    });

    let matrix = TransitionMatrix::build(&sets);
    c.bench_function("matrix_sequence_cost (300 sets)", |b| {
        b.iter(|| matrix.sequence_cost(black_box(&order)))
    });

    let small = setup_sets(60);
    let backend = ScheduleBackend::new(SearchParams {
        search_epochs: 10,
        search_steps: 1_000,
        seed: Some(1),
        ..Default::default()
    });
    let limits = SolveLimits {
        threads: 2,
        time_limit: Duration::from_secs(10),
    };
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    group.bench_function("schedule (60 sets)", |b| {
        b.iter(|| backend.solve(black_box(&small), &limits))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

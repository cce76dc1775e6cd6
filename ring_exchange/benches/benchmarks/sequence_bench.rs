use criterion::{black_box, criterion_group, Criterion};
use ring_exchange::prelude::*;

fn sequence_benchmark(c: &mut Criterion) {
    let sequence = AtomicSequence::default();

    c.bench_function("sequence_get", |b| {
        b.iter(|| {
            black_box(sequence.get());
        })
    });

    c.bench_function("sequence_set", |b| {
        b.iter(|| {
            sequence.set(black_box(42));
        })
    });

    c.bench_function("sequence_compare_exchange_success", |b| {
        sequence.set(0);
        b.iter(|| {
            black_box(sequence.compare_exchange(0, 1));
            sequence.set(0); // Reset for next iteration
        })
    });

    c.bench_function("sequence_compare_exchange_failure", |b| {
        sequence.set(1);
        b.iter(|| {
            black_box(sequence.compare_exchange(0, 2));
        })
    });

    c.bench_function("sequence_increment_and_get", |b| {
        b.iter(|| {
            black_box(sequence.increment_and_get());
        })
    });
}

criterion_group! {
    name = sequence;
    config = Criterion::default().sample_size(100);
    targets = sequence_benchmark
}

use criterion::{black_box, criterion_group, Criterion};
use ring_exchange::prelude::*;

fn availability_buffer_benchmark(c: &mut Criterion) {
    let buffer = AvailabilityBuffer::new(1024);

    c.bench_function("availability_set", |b| {
        let mut sequence = 0i64;
        b.iter(|| {
            buffer.set(black_box(sequence));
            sequence += 1;
        })
    });

    c.bench_function("availability_is_available", |b| {
        buffer.set(7);
        b.iter(|| {
            black_box(buffer.is_available(black_box(7)));
        })
    });

    c.bench_function("availability_set_range_64", |b| {
        b.iter(|| {
            buffer.set_range(black_box(0), black_box(63));
        })
    });

    c.bench_function("availability_highest_published_64", |b| {
        buffer.set_range(0, 63);
        b.iter(|| {
            black_box(buffer.highest_published(black_box(0), black_box(63)));
        })
    });
}

criterion_group! {
    name = availability_buffer;
    config = Criterion::default().sample_size(100);
    targets = availability_buffer_benchmark
}

use criterion::{criterion_group, Criterion, Throughput};
use ring_exchange::prelude::*;

const BATCH: i64 = 100;

fn throughput_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_exchange");
    group.throughput(Throughput::Elements(BATCH as u64));

    group.bench_function("spsc_claim_publish_batch", |b| {
        let ring =
            RingExchange::single_producer(|| 0i64, 4096, BusySpinWaitStrategy::new()).unwrap();

        b.iter(|| {
            let hi = ring.next_n(BATCH as usize);
            let lo = hi - (BATCH - 1);
            for sequence in lo..=hi {
                unsafe {
                    *ring.get_preallocated(sequence) = sequence;
                }
            }
            ring.publish_range(lo, hi);
        })
    });

    group.bench_function("mpsc_claim_publish_batch", |b| {
        let ring =
            RingExchange::multi_producer(|| 0i64, 4096, BusySpinWaitStrategy::new()).unwrap();

        b.iter(|| {
            let hi = ring.next_n(BATCH as usize);
            let lo = hi - (BATCH - 1);
            for sequence in lo..=hi {
                unsafe {
                    *ring.get_preallocated(sequence) = sequence;
                }
            }
            ring.publish_range(lo, hi);
        })
    });

    group.finish();
}

criterion_group! {
    name = throughput;
    config = Criterion::default().sample_size(50);
    targets = throughput_benchmark
}

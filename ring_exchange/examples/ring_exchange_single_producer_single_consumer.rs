//! Single Producer Single Consumer Example
//!
//! This example shows the simplest exchange topology:
//! - One producer thread claiming and publishing events
//! - One consumer stage reading them in publication order
//!
//! Key points:
//! - The single-producer claim path is wait-free while capacity lasts
//! - The consumer idles on a busy-spin strategy for lowest latency
//! - `drain()` waits for the consumer to catch up, then shuts it down

use ring_exchange::prelude::*;
use std::time::Instant;

struct SumHandler {
    count: usize,
    sum: u64,
}

impl EventHandlerMut<u64> for SumHandler {
    fn on_event(&mut self, event: &mut u64, sequence: Sequence, end_of_batch: bool) {
        self.count += 1;
        self.sum += *event;
        if end_of_batch {
            println!(
                "consumed up to sequence {} (count = {}, sum = {})",
                sequence, self.count, self.sum
            );
        }
    }
}

fn main() {
    println!("\nRunning single producer with single consumer example...");
    let start_time = Instant::now();

    let (executor, producer) = RingExchangeBuilder::with_ring_buffer::<u64>(1024)
        .expect("buffer size is a power of two")
        .with_busy_spin_wait()
        .with_single_producer()
        .with_barrier(|scope| {
            scope.handle_events_mut(SumHandler { count: 0, sum: 0 });
        })
        .build();

    let handle = executor.spawn();

    let values: Vec<u64> = (1..=10_000).collect();
    for batch in values.chunks(512) {
        producer.write(batch.iter().copied(), |slot, _sequence, value| {
            *slot = *value;
        });
    }

    producer.drain();
    handle.join();

    println!("done in {:?}", start_time.elapsed());
}

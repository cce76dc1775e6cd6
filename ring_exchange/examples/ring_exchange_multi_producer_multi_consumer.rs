//! Multi Producer Multi Consumer Example
//!
//! This example shows the full topology:
//! - Several producer threads claiming concurrently through the facade
//! - A first consumer stage enriching events in place
//! - A second stage that only runs behind the first (dependency barrier)
//!
//! Key points:
//! - Concurrent claims never hand out the same sequence twice
//! - Consumers only observe the contiguous published prefix, so commit
//!   order may differ from claim order without reordering anything
//! - The downstream stage declares the upstream cursor as its dependency

use ring_exchange::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const PRODUCERS: usize = 3;
const PER_PRODUCER: i64 = 5_000;

#[derive(Clone, Copy, Default)]
struct MarketEvent {
    producer: usize,
    payload: i64,
    checksum: i64,
}

struct ChecksumHandler;

impl EventHandlerMut<MarketEvent> for ChecksumHandler {
    fn on_event(&mut self, event: &mut MarketEvent, _sequence: Sequence, _end_of_batch: bool) {
        event.checksum = event.payload ^ event.producer as i64;
    }
}

struct AuditHandler {
    seen: usize,
}

impl EventHandlerMut<MarketEvent> for AuditHandler {
    fn on_event(&mut self, event: &mut MarketEvent, sequence: Sequence, end_of_batch: bool) {
        assert_eq!(event.checksum, event.payload ^ event.producer as i64);
        self.seen += 1;
        if end_of_batch {
            println!("audited up to sequence {} ({} events)", sequence, self.seen);
        }
    }
}

fn main() {
    println!("\nRunning multi producer with dependent consumers example...");
    let start_time = Instant::now();

    let ring = Arc::new(
        RingExchange::multi_producer(MarketEvent::default, 1024, YieldingWaitStrategy::new())
            .expect("buffer size is a power of two"),
    );

    // Stage one enriches every event; stage two audits behind it.
    let stage_one = BatchEventProcessor::create_mut(ChecksumHandler);
    let stage_one_cursor = stage_one.cursor();
    let stage_two = BatchEventProcessor::create_mut(AuditHandler { seen: 0 });

    let barrier_one = ring.new_barrier(&[]);
    let barrier_two = ring.new_barrier(&[stage_one_cursor]);
    ring.add_gating_sequences(&[stage_two.cursor()]);

    let executor = ThreadedExecutor::with_workers(vec![
        stage_one.into_worker(barrier_one, ring.data_provider()),
        stage_two.into_worker(barrier_two, ring.data_provider()),
    ]);
    let handle = executor.spawn();

    let mut producers = Vec::new();
    for id in 0..PRODUCERS {
        let ring = ring.clone();
        producers.push(thread::spawn(move || {
            for payload in 0..PER_PRODUCER {
                let sequence = ring.next();
                unsafe {
                    let slot = ring.get_preallocated(sequence);
                    slot.producer = id;
                    slot.payload = payload;
                }
                ring.publish(sequence);
            }
        }));
    }
    for producer in producers {
        producer.join().expect("producer thread panicked");
    }

    let ring = Arc::into_inner(ring).expect("all producers have finished");
    ring.drain();
    handle.join();

    println!(
        "published and audited {} events in {:?}",
        PRODUCERS as i64 * PER_PRODUCER,
        start_time.elapsed()
    );
}

// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ring_exchange::prelude::*;

struct CollectingHandler {
    seen: Arc<Mutex<Vec<i64>>>,
}

impl EventHandler<i64> for CollectingHandler {
    fn on_event(&self, event: &i64, _sequence: Sequence, _end_of_batch: bool) {
        self.seen.lock().unwrap().push(*event);
    }
}

struct EndOfBatchHandler {
    batches: Arc<AtomicUsize>,
    events: Arc<AtomicUsize>,
}

impl EventHandler<i64> for EndOfBatchHandler {
    fn on_event(&self, _event: &i64, _sequence: Sequence, end_of_batch: bool) {
        self.events.fetch_add(1, Ordering::SeqCst);
        if end_of_batch {
            self.batches.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct DoublingHandler;

impl EventHandlerMut<i64> for DoublingHandler {
    fn on_event(&mut self, event: &mut i64, _sequence: Sequence, _end_of_batch: bool) {
        *event *= 2;
    }
}

#[test]
fn test_stage_cursor_starts_before_first_sequence() {
    let processor = BatchEventProcessor::create(CollectingHandler {
        seen: Arc::new(Mutex::new(Vec::new())),
    });
    assert_eq!(processor.cursor().get(), -1);
}

#[test]
fn test_stage_consumes_in_order() {
    let ring = RingExchange::single_producer(|| 0i64, 16, BusySpinWaitStrategy::new()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let processor = BatchEventProcessor::create(CollectingHandler { seen: seen.clone() });
    let cursor = processor.cursor();

    let barrier = ring.new_barrier(&[]);
    ring.add_gating_sequences(&[cursor]);
    let worker = processor.into_worker(barrier, ring.data_provider());

    let handle = ThreadedExecutor::with_workers(vec![worker]).spawn();

    for value in 0..100i64 {
        let sequence = ring.next();
        unsafe {
            *ring.get_preallocated(sequence) = value;
        }
        ring.publish(sequence);
    }

    ring.drain();
    handle.join();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 100);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_stage_flags_end_of_batch() {
    let ring = RingExchange::single_producer(|| 0i64, 16, BusySpinWaitStrategy::new()).unwrap();

    let batches = Arc::new(AtomicUsize::new(0));
    let events = Arc::new(AtomicUsize::new(0));
    let processor = BatchEventProcessor::create(EndOfBatchHandler {
        batches: batches.clone(),
        events: events.clone(),
    });

    let barrier = ring.new_barrier(&[]);
    ring.add_gating_sequences(&[processor.cursor()]);
    let worker = processor.into_worker(barrier, ring.data_provider());

    let handle = ThreadedExecutor::with_workers(vec![worker]).spawn();

    for value in 0..50i64 {
        let sequence = ring.next();
        unsafe {
            *ring.get_preallocated(sequence) = value;
        }
        ring.publish(sequence);
    }

    ring.drain();
    handle.join();

    assert_eq!(events.load(Ordering::SeqCst), 50);
    // Every batch ends exactly once; batch boundaries depend on timing.
    let batch_count = batches.load(Ordering::SeqCst);
    assert!(batch_count >= 1);
    assert!(batch_count <= 50);
}

#[test]
fn test_mutable_stage_transforms_events() {
    let ring = RingExchange::single_producer(|| 0i64, 16, BusySpinWaitStrategy::new()).unwrap();

    let stage_a = BatchEventProcessor::create_mut(DoublingHandler);
    let a_cursor = stage_a.cursor();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let stage_b = BatchEventProcessor::create(CollectingHandler { seen: seen.clone() });
    let b_cursor = stage_b.cursor();

    let barrier_a = ring.new_barrier(&[]);
    let barrier_b = ring.new_barrier(&[a_cursor]);
    ring.add_gating_sequences(&[b_cursor]);

    let handle = ThreadedExecutor::with_workers(vec![
        stage_a.into_worker(barrier_a, ring.data_provider()),
        stage_b.into_worker(barrier_b, ring.data_provider()),
    ])
    .spawn();

    for value in 1..=20i64 {
        let sequence = ring.next();
        unsafe {
            *ring.get_preallocated(sequence) = value;
        }
        ring.publish(sequence);
    }

    ring.drain();
    handle.join();

    let seen = seen.lock().unwrap();
    let expected: Vec<i64> = (1..=20).map(|v| v * 2).collect();
    assert_eq!(*seen, expected);
}

#[test]
fn test_stage_exits_on_alert() {
    let ring = RingExchange::single_producer(|| 0i64, 8, BlockingWaitStrategy::new()).unwrap();

    let running = Arc::new(AtomicBool::new(true));
    let observed = Arc::new(AtomicI64::new(-1));

    struct TrackingHandler {
        observed: Arc<AtomicI64>,
    }
    impl EventHandler<i64> for TrackingHandler {
        fn on_event(&self, _event: &i64, sequence: Sequence, _end_of_batch: bool) {
            self.observed.store(sequence, Ordering::SeqCst);
        }
    }

    let processor = BatchEventProcessor::create(TrackingHandler {
        observed: observed.clone(),
    });
    let barrier = Arc::new(ring.new_barrier(&[]));
    ring.add_gating_sequences(&[processor.cursor()]);

    let consumer_barrier = barrier.clone();
    let data_provider = ring.data_provider();
    let flag = running.clone();
    let consumer = std::thread::spawn(move || {
        let worker = processor.into_worker(ArcBarrier(consumer_barrier), data_provider);
        worker.run();
        flag.store(false, Ordering::SeqCst);
    });

    // Nothing is ever published; the alert is the only way out.
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(running.load(Ordering::SeqCst));

    barrier.alert();
    consumer.join().unwrap();

    assert!(!running.load(Ordering::SeqCst));
    assert_eq!(observed.load(Ordering::SeqCst), -1);
}

// Shares one barrier between the worker loop and the alerting thread.
struct ArcBarrier<B: SequenceBarrier>(Arc<B>);

impl<B: SequenceBarrier> SequenceBarrier for ArcBarrier<B> {
    fn wait_for(&self, sequence: Sequence) -> Result<Sequence> {
        self.0.wait_for(sequence)
    }
    fn signal(&self) {
        self.0.signal()
    }
    fn alert(&self) {
        self.0.alert()
    }
    fn clear_alert(&self) {
        self.0.clear_alert()
    }
    fn check_alert(&self) -> Result<()> {
        self.0.check_alert()
    }
}

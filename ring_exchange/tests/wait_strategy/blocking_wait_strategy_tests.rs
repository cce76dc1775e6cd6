// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ring_exchange::prelude::*;

#[test]
fn test_immediate_success() {
    let strategy = BlockingWaitStrategy::new();
    let cursor = AtomicSequence::from(10);
    let alert = AtomicBool::new(false);

    let result = strategy.wait_for(5, &cursor, &[], || alert.load(Ordering::Relaxed));
    assert_eq!(result, Ok(10));
}

#[test]
fn test_alert_surfaces_as_error() {
    let strategy = BlockingWaitStrategy::new();
    let cursor = AtomicSequence::default();
    let alert = AtomicBool::new(true);

    let result = strategy.wait_for(5, &cursor, &[], || alert.load(Ordering::Relaxed));
    assert_eq!(result, Err(RingError::Alert));
}

#[test]
fn test_dependents_gate_the_wait() {
    let strategy = BlockingWaitStrategy::new();
    let cursor = AtomicSequence::from(100);
    let dependents = vec![
        Arc::new(AtomicSequence::from(5)),
        Arc::new(AtomicSequence::from(10)),
        Arc::new(AtomicSequence::from(15)),
    ];
    let alert = AtomicBool::new(false);

    // The slowest upstream stage bounds the result, not the cursor.
    let result = strategy.wait_for(3, &cursor, &dependents, || alert.load(Ordering::Relaxed));
    assert_eq!(result, Ok(5));
}

#[test]
fn test_signal_wakes_blocked_waiter() {
    let strategy = Arc::new(BlockingWaitStrategy::new());
    let cursor = Arc::new(AtomicSequence::default());
    let alert = Arc::new(AtomicBool::new(false));

    let strategy_clone = strategy.clone();
    let cursor_clone = cursor.clone();
    let alert_clone = alert.clone();

    let handle = thread::spawn(move || {
        strategy_clone.wait_for(10, &cursor_clone, &[], || alert_clone.load(Ordering::Relaxed))
    });

    // Sleep briefly to ensure the other thread is waiting.
    thread::sleep(Duration::from_millis(100));

    cursor.set(15);
    strategy.signal_all_when_blocking();

    let result = handle.join().unwrap();
    assert_eq!(result, Ok(15));
}

#[test]
fn test_alert_unblocks_parked_waiter() {
    let strategy = Arc::new(BlockingWaitStrategy::new());
    let cursor = Arc::new(AtomicSequence::default());
    let alert = Arc::new(AtomicBool::new(false));

    let strategy_clone = strategy.clone();
    let cursor_clone = cursor.clone();
    let alert_clone = alert.clone();

    let handle = thread::spawn(move || {
        strategy_clone.wait_for(1000, &cursor_clone, &[], || {
            alert_clone.load(Ordering::Relaxed)
        })
    });

    thread::sleep(Duration::from_millis(50));

    alert.store(true, Ordering::Relaxed);
    strategy.signal_all_when_blocking();

    let result = handle.join().unwrap();
    assert_eq!(result, Err(RingError::Alert));
}

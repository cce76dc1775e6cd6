// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, RingError};
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;
use crate::wait_strategy::{gate_sequence, WaitStrategy};

/// Mutex plus condition variable. Lowest CPU use, highest wake-up latency;
/// the default policy.
///
/// Publishers call [`signal_all_when_blocking`](WaitStrategy::signal_all_when_blocking)
/// after advancing the cursor, which broadcasts to every parked consumer.
pub struct BlockingWaitStrategy {
    guard: Mutex<()>,
    cvar: Condvar,
}

impl WaitStrategy for BlockingWaitStrategy {
    fn new() -> Self {
        Self {
            guard: Mutex::new(()),
            cvar: Condvar::new(),
        }
    }

    fn wait_for<F: Fn() -> bool>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependents: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        loop {
            let mut blocked = self.guard.lock();
            if check_alert() {
                return Err(RingError::Alert);
            }

            let available = gate_sequence(cursor, dependents);
            if available >= sequence {
                return Ok(available);
            }

            // The gate is re-read under the lock on every wake-up, so a
            // signal between the check above and this wait is not lost.
            self.cvar.wait(&mut blocked);
        }
    }

    fn signal_all_when_blocking(&self) {
        let _guard = self.guard.lock();
        self.cvar.notify_all();
    }
}

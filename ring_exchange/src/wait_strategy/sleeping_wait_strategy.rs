// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::hint;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{Result, RingError};
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;
use crate::wait_strategy::{gate_sequence, WaitStrategy};

const SPIN_LIMIT: u32 = 6;
const YIELD_LIMIT: u32 = 10;
const INITIAL_PARK: Duration = Duration::from_micros(1);
// Park quantum cap keeps alert delivery bounded even when nothing is
// published for a long time.
const MAX_PARK: Duration = Duration::from_millis(1);

/// Escalating back-off: spin with pause hints, then yield, then park for
/// nanoseconds with exponentially growing (capped) timeouts.
///
/// Trades a little wake-up latency for a mostly idle CPU while the ring is
/// quiet.
pub struct SleepingWaitStrategy;

impl WaitStrategy for SleepingWaitStrategy {
    fn new() -> Self {
        SleepingWaitStrategy {}
    }

    fn wait_for<F: Fn() -> bool>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependents: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        let mut step = 0u32;
        let mut park = INITIAL_PARK;
        loop {
            let available = gate_sequence(cursor, dependents);
            if available >= sequence {
                return Ok(available);
            }
            if check_alert() {
                return Err(RingError::Alert);
            }

            if step <= SPIN_LIMIT {
                for _ in 0..(1 << step) {
                    hint::spin_loop();
                }
                step += 1;
            } else if step <= YIELD_LIMIT {
                thread::yield_now();
                step += 1;
            } else {
                thread::park_timeout(park);
                park = (park * 2).min(MAX_PARK);
            }
        }
    }

    fn signal_all_when_blocking(&self) {}
}

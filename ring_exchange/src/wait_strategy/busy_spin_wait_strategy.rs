// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::hint;
use std::sync::Arc;

use crate::error::{Result, RingError};
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;
use crate::wait_strategy::{gate_sequence, WaitStrategy};

/// Tight spin, no yield. Lowest latency; burns one CPU per waiting consumer.
pub struct BusySpinWaitStrategy;

impl WaitStrategy for BusySpinWaitStrategy {
    fn new() -> Self {
        BusySpinWaitStrategy {}
    }

    fn wait_for<F: Fn() -> bool>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependents: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence> {
        loop {
            let available = gate_sequence(cursor, dependents);
            if available >= sequence {
                return Ok(available);
            }
            if check_alert() {
                return Err(RingError::Alert);
            }
            hint::spin_loop();
        }
    }

    fn signal_all_when_blocking(&self) {}
}

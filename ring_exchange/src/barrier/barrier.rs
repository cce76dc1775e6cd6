// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

//! # Sequence Barrier
//!
//! The coordination point handed to a consumer: wait until a sequence has
//! been published *and* every declared upstream stage has passed it, and
//! surface alerts raised against this consumer.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::barrier::SequenceBarrier;
use crate::error::{Result, RingError};
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;
use crate::utils::{min_cursor_sequence, AvailabilityBuffer};
use crate::wait_strategy::WaitStrategy;

/// Barrier over the publisher cursor and an optional set of upstream
/// consumer sequences.
///
/// On multi-producer rings the barrier additionally holds the availability
/// flags, because there "cursor >= s" only means `s` has been *claimed*; the
/// readable range is the contiguous published prefix.
///
/// # Fields
///
/// * `cursor` - The publisher cursor this barrier waits on
/// * `dependent_sequences` - Cursors of the upstream stages, empty for a
///   first-stage consumer
/// * `is_alerted` - Cooperative cancellation flag for this barrier
/// * `is_shutdown` - Sequencer-wide shutdown flag shared by all barriers
pub struct ProcessingSequenceBarrier<W: WaitStrategy> {
    cursor: Arc<AtomicSequence>,
    dependent_sequences: Vec<Arc<AtomicSequence>>,
    wait_strategy: Arc<W>,
    is_alerted: AtomicBool,
    is_shutdown: Arc<AtomicBool>,
    availability: Option<Arc<AvailabilityBuffer>>,
}

impl<W: WaitStrategy> ProcessingSequenceBarrier<W> {
    pub fn new(
        wait_strategy: Arc<W>,
        cursor: Arc<AtomicSequence>,
        dependent_sequences: Vec<Arc<AtomicSequence>>,
        is_shutdown: Arc<AtomicBool>,
        availability: Option<Arc<AvailabilityBuffer>>,
    ) -> Self {
        ProcessingSequenceBarrier {
            wait_strategy,
            cursor,
            dependent_sequences,
            is_alerted: AtomicBool::new(false),
            is_shutdown,
            availability,
        }
    }

    #[inline]
    fn alert_raised(&self) -> bool {
        self.is_alerted.load(Ordering::Relaxed) || self.is_shutdown.load(Ordering::Relaxed)
    }
}

impl<W: WaitStrategy> SequenceBarrier for ProcessingSequenceBarrier<W> {
    fn wait_for(&self, sequence: Sequence) -> Result<Sequence> {
        self.check_alert()?;

        let available = self.wait_strategy.wait_for(
            sequence,
            &self.cursor,
            &self.dependent_sequences,
            || self.alert_raised(),
        )?;

        if available < sequence {
            return Ok(available);
        }

        if self.dependent_sequences.is_empty() {
            match &self.availability {
                Some(buffer) => Ok(buffer.highest_published(sequence, available)),
                None => Ok(available),
            }
        } else {
            // Upstream stages only ever advance over published slots, so
            // capping by them needs no further availability scan.
            Ok(available.min(min_cursor_sequence(
                &self.dependent_sequences,
                available,
            )))
        }
    }

    fn signal(&self) {
        self.wait_strategy.signal_all_when_blocking();
    }

    fn alert(&self) {
        self.is_alerted.store(true, Ordering::SeqCst);
        self.wait_strategy.signal_all_when_blocking();
    }

    fn clear_alert(&self) {
        self.is_alerted.store(false, Ordering::SeqCst);
    }

    fn check_alert(&self) -> Result<()> {
        if self.alert_raised() {
            Err(RingError::Alert)
        } else {
            Ok(())
        }
    }
}

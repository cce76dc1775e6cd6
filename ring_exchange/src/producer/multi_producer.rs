//! Multi-producer claim and publication protocol.
//!
//! Any number of threads may claim concurrently: claims race on the cursor
//! with CAS, so the cursor records the highest *claimed* sequence and two
//! successful claims can never return the same value. Publication is
//! recorded per slot in an availability buffer, and consumers advance only
//! over the contiguous published prefix — commit order is free to differ
//! from claim order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use ring_exchange::prelude::*;
//!
//! let sequencer = Arc::new(MultiProducerSequencer::new(8, BusySpinWaitStrategy::new()));
//!
//! let mut handles = vec![];
//! for _ in 0..2 {
//!     let sequencer = sequencer.clone();
//!     handles.push(thread::spawn(move || {
//!         let sequence = sequencer.next();
//!         sequencer.publish(sequence, sequence);
//!     }));
//! }
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(sequencer.get_highest_published_sequence(0, 1), 1);
//! ```

use std::hint;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::barrier::ProcessingSequenceBarrier;
use crate::error::{Result, RingError};
use crate::producer::Sequencer;
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::sequence_group::SequenceGroup;
use crate::sequence::Sequence;
use crate::utils::AvailabilityBuffer;
use crate::wait_strategy::WaitStrategy;

/// Sequencer tolerating any number of producing threads.
///
/// # Type Parameters
///
/// * `W` - The wait strategy consumers idle with
pub struct MultiProducerSequencer<W: WaitStrategy> {
    /// Highest claimed sequence; the claim CAS target
    cursor: Arc<AtomicSequence>,
    /// Non-authoritative cache of the gating minimum; refreshed when a
    /// claim would cross it
    gating_cache: AtomicSequence,
    wait_strategy: Arc<W>,
    gating_sequences: Arc<SequenceGroup>,
    /// Per-slot publication rounds; the authority on readability
    availability: Arc<AvailabilityBuffer>,
    buffer_size: usize,
    is_shutdown: Arc<AtomicBool>,
}

/// Clones share the ring; only the gate cache is private to each handle.
impl<W: WaitStrategy> Clone for MultiProducerSequencer<W> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
            gating_cache: AtomicSequence::default(),
            wait_strategy: self.wait_strategy.clone(),
            gating_sequences: self.gating_sequences.clone(),
            availability: self.availability.clone(),
            buffer_size: self.buffer_size,
            is_shutdown: self.is_shutdown.clone(),
        }
    }
}

impl<W: WaitStrategy> MultiProducerSequencer<W> {
    /// Creates a new multi-producer sequencer.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The size of the ring, a power of two
    /// * `wait_strategy` - The strategy consumers idle with
    pub fn new(buffer_size: usize, wait_strategy: W) -> Self {
        MultiProducerSequencer {
            cursor: Arc::new(AtomicSequence::default()),
            gating_cache: AtomicSequence::default(),
            wait_strategy: Arc::new(wait_strategy),
            gating_sequences: Arc::new(SequenceGroup::new()),
            availability: Arc::new(AvailabilityBuffer::new(buffer_size)),
            buffer_size,
            is_shutdown: Default::default(),
        }
    }

    /// Whether `required` slots past `current` can be claimed without
    /// overtaking the slowest gating sequence. Refreshes the gate cache.
    fn capacity_available(&self, current: Sequence, required: usize) -> bool {
        let wrap_point = current + required as Sequence - self.buffer_size as Sequence;
        let cached_gate = self.gating_cache.get();

        if wrap_point > cached_gate || cached_gate > current {
            let min_sequence = self.gating_sequences.minimum_sequence(current);
            self.gating_cache.set(min_sequence);
            if wrap_point > min_sequence {
                return false;
            }
        }
        true
    }
}

impl<W: WaitStrategy> Sequencer for MultiProducerSequencer<W> {
    type Barrier = ProcessingSequenceBarrier<W>;

    fn next_n(&self, n: usize) -> Sequence {
        loop {
            let current = self.cursor.get();
            let next = current + n as Sequence;
            let wrap_point = next - self.buffer_size as Sequence;
            let cached_gate = self.gating_cache.get();

            if wrap_point > cached_gate || cached_gate > current {
                let gating_sequence = self.gating_sequences.minimum_sequence(current);
                if wrap_point > gating_sequence {
                    hint::spin_loop();
                    continue;
                }
                self.gating_cache.set(gating_sequence);
            } else if self.cursor.compare_exchange(current, next) {
                return next;
            }
        }
    }

    fn try_next_n(&self, n: usize) -> Result<Sequence> {
        loop {
            let current = self.cursor.get();
            let next = current + n as Sequence;

            if !self.capacity_available(current, n) {
                return Err(RingError::InsufficientCapacity);
            }
            if self.cursor.compare_exchange(current, next) {
                return Ok(next);
            }
        }
    }

    fn has_available_capacity(&self, required: usize) -> bool {
        self.capacity_available(self.cursor.get(), required)
    }

    fn claim(&self, _sequence: Sequence) -> Result<()> {
        // Seeding would have to invent publication rounds for slots nobody
        // wrote; unwritten slots would turn readable.
        Err(RingError::illegal_state(
            "a multi-producer sequencer cannot be seeded",
        ))
    }

    #[inline(always)]
    fn publish(&self, lo: Sequence, hi: Sequence) {
        if lo == hi {
            self.availability.set(hi);
        } else {
            self.availability.set_range(lo, hi);
        }
        self.wait_strategy.signal_all_when_blocking();
    }

    fn is_available(&self, sequence: Sequence) -> bool {
        self.availability.is_available(sequence)
    }

    fn get_highest_published_sequence(&self, next: Sequence, available: Sequence) -> Sequence {
        self.availability.highest_published(next, available)
    }

    fn create_barrier(
        &self,
        dependents: &[Arc<AtomicSequence>],
    ) -> ProcessingSequenceBarrier<W> {
        ProcessingSequenceBarrier::new(
            self.wait_strategy.clone(),
            self.cursor.clone(),
            Vec::from(dependents),
            self.is_shutdown.clone(),
            Some(self.availability.clone()),
        )
    }

    fn add_gating_sequences(&self, sequences: &[Arc<AtomicSequence>]) {
        self.gating_sequences.add(&self.cursor, sequences);
    }

    fn remove_gating_sequence(&self, sequence: &Arc<AtomicSequence>) -> bool {
        self.gating_sequences.remove(sequence)
    }

    fn get_cursor(&self) -> Arc<AtomicSequence> {
        self.cursor.clone()
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn drain(self) {
        let current = self.cursor.get();
        while self.gating_sequences.minimum_sequence(current) < current {
            self.wait_strategy.signal_all_when_blocking();
        }
        self.is_shutdown.store(true, Ordering::SeqCst);
        self.wait_strategy.signal_all_when_blocking();
    }
}

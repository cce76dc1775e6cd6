//! Single-producer claim and publication protocol.
//!
//! With exactly one producing thread, claim bookkeeping (`next_value` and
//! the cached gate) needs no atomics; only the cursor publication is a
//! Release store. The caller is responsible for the single-writer guarantee.
//!
//! # Example
//!
//! ```
//! use ring_exchange::prelude::*;
//!
//! let sequencer = SingleProducerSequencer::new(8, BlockingWaitStrategy::new());
//!
//! let hi = sequencer.next_n(2);
//! assert_eq!(hi, 1);
//! sequencer.publish(0, hi);
//! assert_eq!(sequencer.get_cursor().get(), 1);
//! ```

use std::cell::Cell;
use std::hint;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::barrier::ProcessingSequenceBarrier;
use crate::error::{Result, RingError};
use crate::producer::{EventProducer, Sequencer};
use crate::ringbuffer::DataProvider;
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::sequence_group::SequenceGroup;
use crate::sequence::{Sequence, INITIAL_CURSOR_VALUE};
use crate::wait_strategy::WaitStrategy;

/// A producer that writes events to the ring in iterator batches.
///
/// # Type Parameters
///
/// * `D` - The data provider that owns the slot storage
/// * `T` - The event type
/// * `S` - The sequencer coordinating access
pub struct Producer<D: DataProvider<T>, T, S: Sequencer> {
    sequencer: S,
    data_provider: Arc<D>,
    _element: std::marker::PhantomData<T>,
}

/// Sequencer for rings with exactly one producing thread.
///
/// `next_value` is the last claimed sequence and `cached_gate` the last
/// observed minimum of the gating sequences; both are plain cells under the
/// single-writer discipline, which is what makes this claim path wait-free
/// when capacity is available.
pub struct SingleProducerSequencer<W: WaitStrategy> {
    /// Highest published sequence, what consumers wait on
    cursor: Arc<AtomicSequence>,
    /// Last claimed sequence; owned by the producing thread
    next_value: Cell<Sequence>,
    /// Cached minimum of the gating sequences, refreshed only when a claim
    /// would cross it
    cached_gate: Cell<Sequence>,
    wait_strategy: Arc<W>,
    gating_sequences: SequenceGroup,
    buffer_size: usize,
    is_shutdown: Arc<AtomicBool>,
}

impl<W: WaitStrategy> SingleProducerSequencer<W> {
    /// Creates a new single-producer sequencer.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The size of the ring, a power of two
    /// * `wait_strategy` - The strategy consumers idle with
    pub fn new(buffer_size: usize, wait_strategy: W) -> Self {
        SingleProducerSequencer {
            cursor: Arc::new(AtomicSequence::default()),
            next_value: Cell::new(INITIAL_CURSOR_VALUE),
            cached_gate: Cell::new(INITIAL_CURSOR_VALUE),
            wait_strategy: Arc::new(wait_strategy),
            gating_sequences: SequenceGroup::new(),
            buffer_size,
            is_shutdown: Default::default(),
        }
    }

    /// Gate check shared by the non-blocking claim paths. Refreshes the
    /// cached gate from the registry when the cached value is stale.
    fn capacity_available(&self, required: usize) -> bool {
        let next_value = self.next_value.get();
        let wrap_point = next_value + required as Sequence - self.buffer_size as Sequence;
        let cached_gate = self.cached_gate.get();

        if wrap_point > cached_gate || cached_gate > next_value {
            let min_sequence = self.gating_sequences.minimum_sequence(next_value);
            self.cached_gate.set(min_sequence);
            if wrap_point > min_sequence {
                return false;
            }
        }
        true
    }
}

impl<W: WaitStrategy> Sequencer for SingleProducerSequencer<W> {
    type Barrier = ProcessingSequenceBarrier<W>;

    fn next_n(&self, n: usize) -> Sequence {
        let next_value = self.next_value.get();
        let next = next_value + n as Sequence;
        let wrap_point = next - self.buffer_size as Sequence;
        let cached_gate = self.cached_gate.get();

        if wrap_point > cached_gate || cached_gate > next_value {
            loop {
                let min_sequence = self.gating_sequences.minimum_sequence(next_value);
                if wrap_point <= min_sequence {
                    self.cached_gate.set(min_sequence);
                    break;
                }
                hint::spin_loop();
            }
        }

        self.next_value.set(next);
        next
    }

    fn try_next_n(&self, n: usize) -> Result<Sequence> {
        if !self.capacity_available(n) {
            return Err(RingError::InsufficientCapacity);
        }

        let next = self.next_value.get() + n as Sequence;
        self.next_value.set(next);
        Ok(next)
    }

    fn has_available_capacity(&self, required: usize) -> bool {
        self.capacity_available(required)
    }

    fn claim(&self, sequence: Sequence) -> Result<()> {
        if !self.gating_sequences.is_empty() {
            return Err(RingError::illegal_state(
                "cannot seed the sequencer once gating sequences are registered",
            ));
        }
        self.next_value.set(sequence);
        self.cursor.set(sequence);
        Ok(())
    }

    #[inline(always)]
    fn publish(&self, _: Sequence, hi: Sequence) {
        self.cursor.set(hi);
        self.wait_strategy.signal_all_when_blocking();
    }

    fn is_available(&self, sequence: Sequence) -> bool {
        // The single producer publishes in claim order, so everything up to
        // the cursor is necessarily written.
        sequence <= self.cursor.get()
    }

    #[inline(always)]
    fn get_highest_published_sequence(&self, _: Sequence, available: Sequence) -> Sequence {
        available
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
            None,
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
        let current = self.next_value.get();
        while self.gating_sequences.minimum_sequence(current) < current {
            self.wait_strategy.signal_all_when_blocking();
        }
        self.is_shutdown.store(true, Ordering::SeqCst);
        self.wait_strategy.signal_all_when_blocking();
    }
}

impl<W: WaitStrategy> Drop for SingleProducerSequencer<W> {
    fn drop(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
        self.wait_strategy.signal_all_when_blocking();
    }
}

// SAFETY: `next_value` and `cached_gate` are only touched by the claim
// methods, which the single-producer contract restricts to one thread; all
// state shared with consumers is atomic.
unsafe impl<W: WaitStrategy> Send for SingleProducerSequencer<W> {}
unsafe impl<W: WaitStrategy> Sync for SingleProducerSequencer<W> {}

impl<D: DataProvider<T>, T, S: Sequencer> EventProducer for Producer<D, T, S> {
    type Item = T;

    fn write<I, F>(&self, items: I, bind: F)
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        F: Fn(&mut Self::Item, Sequence, &I::Item),
    {
        let iter = items.into_iter();
        let count = iter.len();
        if count == 0 {
            return;
        }

        let end = self.sequencer.next_n(count);
        let start = end - (count - 1) as Sequence;
        for (offset, item) in iter.enumerate() {
            let sequence = start + offset as Sequence;
            let slot = unsafe { self.data_provider.slot_mut(sequence) };
            bind(slot, sequence, &item);
        }
        self.sequencer.publish(start, end);
    }

    fn drain(self) {
        self.sequencer.drain()
    }
}

impl<D: DataProvider<T>, T, S: Sequencer> Producer<D, T, S> {
    /// Creates a new producer over the given storage and sequencer.
    pub fn new(data_provider: Arc<D>, sequencer: S) -> Self {
        Producer {
            data_provider,
            sequencer,
            _element: Default::default(),
        }
    }
}

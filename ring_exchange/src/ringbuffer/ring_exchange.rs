//! The ring facade: slot storage, claim protocol, publication and the
//! translator-publish convenience API behind one handle.
//!
//! # Example
//!
//! ```
//! use ring_exchange::prelude::*;
//!
//! let ring = RingExchange::single_producer(|| 0u64, 8, BusySpinWaitStrategy::new()).unwrap();
//!
//! let sequence = ring.publish_event(|event: &mut u64, sequence| {
//!     *event = sequence as u64 * 2;
//! });
//!
//! assert_eq!(sequence, 0);
//! assert_eq!(unsafe { *ring.get(0) }, 0);
//! ```

use std::hint;
use std::sync::Arc;

use crate::error::{Result, RingError};
use crate::producer::multi_producer::MultiProducerSequencer;
use crate::producer::single_producer::SingleProducerSequencer;
use crate::producer::Sequencer;
use crate::ringbuffer::ringbuffer::RingBuffer;
use crate::ringbuffer::{DataProvider, EventTranslator};
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;
use crate::wait_strategy::WaitStrategy;

/// A sequenced event exchange over preallocated ring storage.
///
/// Combines the slot array, the gating-sequence registry and the claim /
/// publication protocol of its sequencer. The producer mode is fixed at
/// construction through the sequencer type parameter.
///
/// # Type Parameters
///
/// * `E` - The event type stored in the slots
/// * `S` - The sequencer; selects single- or multi-producer coordination
pub struct RingExchange<E, S: Sequencer> {
    data_provider: Arc<RingBuffer<E>>,
    sequencer: S,
}

impl<E, W> RingExchange<E, SingleProducerSequencer<W>>
where
    E: Send + Sync,
    W: WaitStrategy,
{
    /// Creates a ring for exactly one producing thread.
    ///
    /// `factory` is invoked once per slot. Fails with
    /// [`RingError::InvalidConfiguration`](crate::error::RingError) unless
    /// `buffer_size` is a power of two.
    pub fn single_producer<F>(factory: F, buffer_size: usize, wait_strategy: W) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        let data_provider = Arc::new(RingBuffer::new(buffer_size, factory)?);
        let sequencer = SingleProducerSequencer::new(buffer_size, wait_strategy);
        Ok(RingExchange {
            data_provider,
            sequencer,
        })
    }
}

impl<E, W> RingExchange<E, MultiProducerSequencer<W>>
where
    E: Send + Sync,
    W: WaitStrategy,
{
    /// Creates a ring tolerating any number of producing threads.
    ///
    /// `factory` is invoked once per slot. Fails with
    /// [`RingError::InvalidConfiguration`](crate::error::RingError) unless
    /// `buffer_size` is a power of two.
    pub fn multi_producer<F>(factory: F, buffer_size: usize, wait_strategy: W) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        let data_provider = Arc::new(RingBuffer::new(buffer_size, factory)?);
        let sequencer = MultiProducerSequencer::new(buffer_size, wait_strategy);
        Ok(RingExchange {
            data_provider,
            sequencer,
        })
    }
}

impl<E, S> RingExchange<E, S>
where
    E: Send + Sync,
    S: Sequencer,
{
    /// Claims the next sequence, waiting for capacity if the ring is full.
    pub fn next(&self) -> Sequence {
        self.sequencer.next()
    }

    /// Claims the next `n` contiguous sequences and returns the highest.
    pub fn next_n(&self, n: usize) -> Sequence {
        self.sequencer.next_n(n)
    }

    /// Claims the next sequence, or fails with
    /// [`RingError::InsufficientCapacity`](crate::error::RingError) instead
    /// of waiting.
    pub fn try_next(&self) -> Result<Sequence> {
        self.sequencer.try_next()
    }

    /// Claims the next `n` contiguous sequences without waiting.
    pub fn try_next_n(&self, n: usize) -> Result<Sequence> {
        self.sequencer.try_next_n(n)
    }

    /// Publishes a claimed sequence, making its slot readable.
    pub fn publish(&self, sequence: Sequence) {
        self.sequencer.publish(sequence, sequence);
    }

    /// Publishes every claimed sequence in `[lo, hi]`.
    pub fn publish_range(&self, lo: Sequence, hi: Sequence) {
        self.sequencer.publish(lo, hi);
    }

    /// Returns the event at `sequence`, waiting until it has been published.
    ///
    /// # Safety
    ///
    /// The reference aliases the slot, which will be recycled once the ring
    /// wraps. The caller must not hold it past advancing its own gating
    /// sequence beyond `sequence`.
    pub unsafe fn get(&self, sequence: Sequence) -> &E {
        while !self.sequencer.is_available(sequence) {
            hint::spin_loop();
        }
        self.data_provider.slot(sequence)
    }

    /// Returns the preallocated slot at `sequence` without any wait.
    ///
    /// # Safety
    ///
    /// Producer-only: the caller must hold the claim on `sequence` and hand
    /// the reference back (by publishing) before anyone else may touch the
    /// slot.
    pub unsafe fn get_preallocated(&self, sequence: Sequence) -> &mut E {
        self.data_provider.slot_mut(sequence)
    }

    /// Claims one sequence, applies `translator` to its slot and publishes.
    ///
    /// The sequence is published on every exit path: a panicking translator
    /// still commits the slot (holding it back would block every consumer on
    /// an uncommittable sequence forever) and the panic then propagates to
    /// the caller.
    pub fn publish_event<T>(&self, translator: T) -> Sequence
    where
        T: EventTranslator<E>,
    {
        let sequence = self.sequencer.next();
        self.translate_and_publish(translator, sequence);
        sequence
    }

    /// Like [`publish_event`](Self::publish_event), but fails with
    /// [`RingError::InsufficientCapacity`](crate::error::RingError) unless
    /// `required_capacity` further sequences could currently be claimed.
    pub fn try_publish_event<T>(&self, translator: T, required_capacity: usize) -> Result<Sequence>
    where
        T: EventTranslator<E>,
    {
        if !self.sequencer.has_available_capacity(required_capacity) {
            return Err(RingError::InsufficientCapacity);
        }
        let sequence = self.sequencer.try_next()?;
        self.translate_and_publish(translator, sequence);
        Ok(sequence)
    }

    fn translate_and_publish<T>(&self, translator: T, sequence: Sequence)
    where
        T: EventTranslator<E>,
    {
        // Publication happens when the guard drops, unwinding included.
        let _guard = PublishGuard {
            sequencer: &self.sequencer,
            sequence,
        };
        let event = unsafe { self.data_provider.slot_mut(sequence) };
        translator.translate_to(event, sequence);
    }

    /// Creates a barrier gated on this ring's cursor and the given upstream
    /// consumer sequences.
    pub fn new_barrier(&self, dependents: &[Arc<AtomicSequence>]) -> S::Barrier {
        self.sequencer.create_barrier(dependents)
    }

    /// Registers consumer cursors that throttle the producers of this ring.
    pub fn add_gating_sequences(&self, sequences: &[Arc<AtomicSequence>]) {
        self.sequencer.add_gating_sequences(sequences);
    }

    /// Removes a gating sequence; returns whether it was registered.
    pub fn remove_gating_sequence(&self, sequence: &Arc<AtomicSequence>) -> bool {
        self.sequencer.remove_gating_sequence(sequence)
    }

    /// Returns whether `required` further sequences could be claimed right
    /// now without waiting.
    pub fn has_available_capacity(&self, required: usize) -> bool {
        self.sequencer.has_available_capacity(required)
    }

    /// Seeds the ring to `sequence`; single-producer rings only, and only
    /// before any gating sequence is registered.
    pub fn initialise_to(&self, sequence: Sequence) -> Result<()> {
        self.sequencer.claim(sequence)
    }

    /// The publisher cursor of this ring.
    pub fn get_cursor(&self) -> Arc<AtomicSequence> {
        self.sequencer.get_cursor()
    }

    /// Returns the number of slots.
    pub fn buffer_size(&self) -> usize {
        self.data_provider.capacity()
    }

    /// The slot storage, for wiring event processors.
    pub fn data_provider(&self) -> Arc<RingBuffer<E>> {
        self.data_provider.clone()
    }

    /// Waits until every gating consumer has caught up with the cursor, then
    /// shuts the ring down, releasing all blocked consumers.
    pub fn drain(self) {
        self.sequencer.drain();
    }

    /// The sequencer coordinating this ring.
    pub fn sequencer(&self) -> &S {
        &self.sequencer
    }
}

struct PublishGuard<'a, S: Sequencer> {
    sequencer: &'a S,
    sequence: Sequence,
}

impl<S: Sequencer> Drop for PublishGuard<'_, S> {
    fn drop(&mut self) {
        self.sequencer.publish(self.sequence, self.sequence);
    }
}

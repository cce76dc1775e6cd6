//! Producer side of the ring exchange.
//!
//! This module provides the two claim protocols of the exchange:
//! - Single producer: caller guarantees exactly one producing thread; the
//!   claim path needs no atomic read-modify-write at all.
//! - Multi producer: any number of producing threads; claims race on the
//!   cursor with CAS and publication is tracked per slot.
//!
//! Both respect the gating sequences registered against them so a claim
//! never laps the slowest consumer.

pub(crate) mod multi_producer;
pub(crate) mod single_producer;

use std::sync::Arc;

use crate::barrier::SequenceBarrier;
use crate::error::Result;
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;

/// The claim and publication protocol of a ring.
///
/// A sequencer hands out monotonically increasing sequences to producers
/// without overtaking the slowest gating consumer, and answers the
/// consumer-side question "is sequence `s` readable yet".
pub trait Sequencer: Send + Sync {
    type Barrier: SequenceBarrier + 'static;

    /// Claims the next sequence, waiting for capacity if the ring is full.
    fn next(&self) -> Sequence {
        self.next_n(1)
    }

    /// Claims the next `n` contiguous sequences and returns the highest.
    ///
    /// Waits for capacity if the claim would lap the slowest gating sequence.
    fn next_n(&self, n: usize) -> Sequence;

    /// Claims the next sequence without waiting.
    fn try_next(&self) -> Result<Sequence> {
        self.try_next_n(1)
    }

    /// Claims the next `n` contiguous sequences without waiting.
    ///
    /// Returns [`RingError::InsufficientCapacity`](crate::error::RingError)
    /// when the claim would have to wait on a gating sequence.
    fn try_next_n(&self, n: usize) -> Result<Sequence>;

    /// Returns whether `required` further sequences could be claimed right
    /// now without waiting. Non-blocking and non-binding.
    fn has_available_capacity(&self, required: usize) -> bool;

    /// Seeds the sequencer (and its publication state) to `sequence`.
    ///
    /// Administrative: legal only before any gating sequence is registered;
    /// afterwards it fails with
    /// [`RingError::IllegalState`](crate::error::RingError).
    fn claim(&self, sequence: Sequence) -> Result<()>;

    /// Publishes every sequence in `[lo, hi]`, making the slots readable.
    fn publish(&self, lo: Sequence, hi: Sequence);

    /// Returns whether `sequence` has been published.
    fn is_available(&self, sequence: Sequence) -> bool;

    /// Returns the highest sequence in `[next, available]` up to which the
    /// published prefix is contiguous, or `next - 1` if there is none.
    fn get_highest_published_sequence(&self, next: Sequence, available: Sequence) -> Sequence;

    /// Creates a barrier gated on this sequencer's cursor and the given
    /// upstream `dependents`.
    fn create_barrier(&self, dependents: &[Arc<AtomicSequence>]) -> Self::Barrier;

    /// Registers consumer cursors that throttle this producer.
    fn add_gating_sequences(&self, sequences: &[Arc<AtomicSequence>]);

    /// Removes a gating sequence; returns whether it was registered.
    fn remove_gating_sequence(&self, sequence: &Arc<AtomicSequence>) -> bool;

    /// The sequencer's own cursor. Highest published sequence for a single
    /// producer; highest claimed for multi producers.
    fn get_cursor(&self) -> Arc<AtomicSequence>;

    /// Returns the size of the ring this sequencer coordinates.
    fn buffer_size(&self) -> usize;

    /// Waits until every gating sequence has caught up with the cursor, then
    /// shuts down every barrier created from this sequencer.
    fn drain(self)
    where
        Self: Sized;
}

/// Batch-writing convenience over a sequencer and its slot storage.
///
/// `write` claims one slot per item of the iterator, lets `bind` move each
/// item into its slot, and publishes the whole range. A single call must not
/// exceed the ring capacity. `drain` shuts the ring down once the producer
/// is no longer needed: it waits for consumers to catch up and then releases
/// them.
pub trait EventProducer {
    type Item;

    /// Writes one event per iterator item and publishes them as one range.
    fn write<I, F>(&self, items: I, bind: F)
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        F: Fn(&mut Self::Item, Sequence, &I::Item);

    /// Drains the ring once it is no longer needed, consuming the producer.
    fn drain(self);
}

// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

mod batch_event_processor;

pub use batch_event_processor::*;

use std::sync::Arc;

use crate::barrier::SequenceBarrier;
use crate::executor::Worker;
use crate::ringbuffer::DataProvider;
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;

/// Callback for one event read from the ring.
///
/// `end_of_batch` is true for the last event of the batch the processor
/// pulled in one pass; handlers batching downstream work flush on it.
pub trait EventHandler<T> {
    fn on_event(&self, event: &T, sequence: Sequence, end_of_batch: bool);
}

/// Callback for one event with exclusive access to its slot.
///
/// Used by pipeline stages that enrich events in place for stages behind
/// them. The dependency barrier keeps later stages out of the slot while the
/// handler holds it.
pub trait EventHandlerMut<T> {
    fn on_event(&mut self, event: &mut T, sequence: Sequence, end_of_batch: bool);
}

/// A consumer stage before it is bound to a ring.
///
/// The stage owns the cursor that producers and downstream stages gate on;
/// `into_worker` binds it to the barrier it waits on and the storage it
/// reads, yielding the loop an executor drives.
pub trait EventProcessorMut<T> {
    /// Binds the stage to a barrier and slot storage.
    fn into_worker<B, D>(self, barrier: B, storage: Arc<D>) -> Box<dyn Worker>
    where
        B: SequenceBarrier + 'static,
        D: DataProvider<T> + 'static;

    /// The cursor tracking this stage's progress.
    fn cursor(&self) -> Arc<AtomicSequence>;
}

/// Marker for stages whose handler only needs shared access to events.
pub trait EventProcessor<T>: EventProcessorMut<T> {}

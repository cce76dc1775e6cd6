// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

//! Batch-draining consumer stages.
//!
//! A stage owns one [`AtomicSequence`] starting at −1. Its worker loop asks
//! the barrier for the sequence after its cursor, walks everything the
//! barrier hands back in one pass, advances the cursor once per pass and
//! signals. The barrier erroring out (alert or shutdown) ends the loop.
//!
//! Shared and exclusive handlers run through the same loop; the small
//! [`Dispatch`] seam is the only place the two differ.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::barrier::SequenceBarrier;
use crate::consumer::{EventHandler, EventHandlerMut, EventProcessor, EventProcessorMut};
use crate::executor::Worker;
use crate::ringbuffer::DataProvider;
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;

/// Factory for batch consumer stages.
///
/// `create` wraps an [`EventHandler`], `create_mut` an [`EventHandlerMut`];
/// both yield a stage to bind via
/// [`into_worker`](EventProcessorMut::into_worker).
pub struct BatchEventProcessor;

impl BatchEventProcessor {
    /// Creates a stage around an immutable event handler.
    pub fn create<H, T>(handler: H) -> impl EventProcessor<T>
    where
        T: Send + 'static,
        H: EventHandler<T> + Send + 'static,
    {
        BatchStage::with_dispatch(Shared(handler))
    }

    /// Creates a stage around a mutable event handler.
    pub fn create_mut<H, T>(handler: H) -> impl EventProcessorMut<T>
    where
        T: Send + 'static,
        H: EventHandlerMut<T> + Send + 'static,
    {
        BatchStage::with_dispatch(Exclusive(handler))
    }
}

/// Uniform dispatch over shared and exclusive handlers.
trait Dispatch<T>: Send {
    /// Reads the slot at `sequence` and feeds it to the handler.
    ///
    /// # Safety
    ///
    /// `sequence` must have been published, and for an exclusive dispatch no
    /// other stage may touch the slot during the call (the caller's barrier
    /// dependencies guarantee this).
    unsafe fn apply<D: DataProvider<T>>(
        &mut self,
        storage: &D,
        sequence: Sequence,
        end_of_batch: bool,
    );
}

struct Shared<H>(H);

struct Exclusive<H>(H);

impl<T, H> Dispatch<T> for Shared<H>
where
    H: EventHandler<T> + Send,
{
    unsafe fn apply<D: DataProvider<T>>(
        &mut self,
        storage: &D,
        sequence: Sequence,
        end_of_batch: bool,
    ) {
        self.0.on_event(storage.slot(sequence), sequence, end_of_batch);
    }
}

impl<T, H> Dispatch<T> for Exclusive<H>
where
    H: EventHandlerMut<T> + Send,
{
    unsafe fn apply<D: DataProvider<T>>(
        &mut self,
        storage: &D,
        sequence: Sequence,
        end_of_batch: bool,
    ) {
        self.0.on_event(storage.slot_mut(sequence), sequence, end_of_batch);
    }
}

/// One consumer stage: a dispatcher plus the cursor others gate on.
struct BatchStage<P, T> {
    dispatch: P,
    sequence: Arc<AtomicSequence>,
    _event: PhantomData<T>,
}

impl<P, T> BatchStage<P, T> {
    fn with_dispatch(dispatch: P) -> Self {
        BatchStage {
            dispatch,
            sequence: Default::default(),
            _event: PhantomData,
        }
    }
}

impl<P, T> EventProcessorMut<T> for BatchStage<P, T>
where
    P: Dispatch<T> + 'static,
    T: Send + 'static,
{
    fn into_worker<B, D>(self, barrier: B, storage: Arc<D>) -> Box<dyn Worker>
    where
        B: SequenceBarrier + 'static,
        D: DataProvider<T> + 'static,
    {
        Box::new(StageWorker {
            stage: self,
            storage,
            barrier,
        })
    }

    fn cursor(&self) -> Arc<AtomicSequence> {
        self.sequence.clone()
    }
}

impl<H, T> EventProcessor<T> for BatchStage<Shared<H>, T>
where
    H: EventHandler<T> + Send + 'static,
    T: Send + 'static,
{
}

/// The running loop of one stage.
struct StageWorker<P, T, D, B> {
    stage: BatchStage<P, T>,
    storage: Arc<D>,
    barrier: B,
}

impl<P, T, D, B> Worker for StageWorker<P, T, D, B>
where
    P: Dispatch<T>,
    T: Send,
    D: DataProvider<T>,
    B: SequenceBarrier,
{
    fn run(mut self: Box<Self>) {
        let mut next = self.stage.sequence.get() + 1;

        // An Err from the barrier is the stop signal.
        while let Ok(available) = self.barrier.wait_for(next) {
            // The barrier may resolve below the request (e.g. a published
            // hole on a multi-producer ring); the empty range simply
            // re-enters the wait.
            for sequence in next..=available {
                unsafe {
                    self.stage
                        .dispatch
                        .apply(&*self.storage, sequence, sequence == available);
                }
            }

            if available >= next {
                self.stage.sequence.set(available);
                self.barrier.signal();
                next = available + 1;
            }
        }
    }
}

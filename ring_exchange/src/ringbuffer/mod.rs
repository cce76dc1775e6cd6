// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

mod ring_exchange;
mod ringbuffer;

pub use crate::ringbuffer::ring_exchange::*;
pub use crate::ringbuffer::ringbuffer::*;

use crate::sequence::Sequence;

#[allow(clippy::mut_from_ref)]
/// Slot storage addressed by sequence number.
///
/// Neither accessor synchronizes anything; the claim-then-publish protocol
/// does. Only the producer holding sequence `s` may write slot `s`, and no
/// reader touches it before the publication of `s` has been observed.
pub trait DataProvider<T>: Sync + Send {
    /// Returns the size of the buffer.
    fn buffer_size(&self) -> usize;

    /// Exclusive access to the slot `sequence` maps onto.
    ///
    /// # Safety
    ///
    /// The caller must hold the claim on `sequence`; any other access to the
    /// same slot at the same time is a data race.
    unsafe fn slot_mut(&self, sequence: Sequence) -> &mut T;

    /// Shared access to the slot `sequence` maps onto.
    ///
    /// # Safety
    ///
    /// The caller must have observed the publication of `sequence` and must
    /// not hold the reference once its own gating sequence has moved past it.
    unsafe fn slot(&self, sequence: Sequence) -> &T;
}

/// A callback that fills a claimed slot before it is published.
///
/// Invoked exactly once per claimed sequence, between claim and publish. The
/// slot is published on every exit path, including a panicking translator:
/// holding the sequence back would leave every consumer blocked on it
/// forever. A translator that can fail should record the failure in the
/// event payload itself.
///
/// Arguments are carried by the translator value; closures of the shape
/// `Fn(&mut T, Sequence)` implement the trait directly.
pub trait EventTranslator<T> {
    fn translate_to(&self, event: &mut T, sequence: Sequence);
}

impl<T, F> EventTranslator<T> for F
where
    F: Fn(&mut T, Sequence),
{
    fn translate_to(&self, event: &mut T, sequence: Sequence) {
        self(event, sequence)
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

//! Registry of the gating sequences that throttle a producer.
//!
//! The registry holds an immutable snapshot of consumer cursors. Additions
//! and removals build a fresh snapshot and install it wholesale; the claim
//! hot path only ever reads a snapshot, so it never observes a half-updated
//! membership and never blocks on a writer for longer than the pointer swap.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;

type Snapshot = Arc<Vec<Arc<AtomicSequence>>>;

/// An atomically replaced set of gating sequences.
///
/// Producers must not claim a sequence `s` with
/// `s - buffer_size >= minimum_sequence(..)`; consumers are registered here so
/// that the claim protocol can enforce exactly that.
pub struct SequenceGroup {
    sequences: RwLock<Snapshot>,
}

impl SequenceGroup {
    pub fn new() -> Self {
        Self {
            sequences: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Adds `additions` to the group.
    ///
    /// Each added sequence is first set to the current cursor value so a
    /// freshly attached consumer does not throttle the producer
    /// retroactively. The set is repeated after installation: the cursor may
    /// have advanced between seeding and the snapshot swap, and the second
    /// store closes that window.
    pub fn add(&self, cursor: &AtomicSequence, additions: &[Arc<AtomicSequence>]) {
        {
            let mut current = self.sequences.write();
            let mut next = Vec::with_capacity(current.len() + additions.len());
            next.extend(current.iter().cloned());
            for sequence in additions {
                sequence.set(cursor.get());
                next.push(sequence.clone());
            }
            *current = Arc::new(next);
        }

        for sequence in additions {
            sequence.set_volatile(cursor.get());
        }
    }

    /// Removes every occurrence of `sequence` (by pointer identity).
    ///
    /// Returns `true` if at least one occurrence was removed.
    pub fn remove(&self, sequence: &Arc<AtomicSequence>) -> bool {
        let mut current = self.sequences.write();
        let retained: Vec<_> = current
            .iter()
            .filter(|s| !Arc::ptr_eq(s, sequence))
            .cloned()
            .collect();

        let removed = retained.len() != current.len();
        if removed {
            *current = Arc::new(retained);
        }
        removed
    }

    /// Returns the current membership snapshot.
    ///
    /// The snapshot is immutable; holding it never blocks writers.
    pub fn snapshot(&self) -> Snapshot {
        self.sequences.read().clone()
    }

    /// Returns the minimum over the registered sequences and `minimum`.
    ///
    /// With an empty group this is `minimum` itself, which leaves a
    /// consumer-less producer gated only by its own progress.
    pub fn minimum_sequence(&self, minimum: Sequence) -> Sequence {
        self.snapshot()
            .iter()
            .map(|s| s.get())
            .fold(minimum, Sequence::min)
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }
}

impl Default for SequenceGroup {
    fn default() -> Self {
        Self::new()
    }
}

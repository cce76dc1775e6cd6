// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::sync::Arc;

use ring_exchange::prelude::*;

#[test]
fn test_empty_group() {
    let group = SequenceGroup::new();
    assert!(group.is_empty());
    assert_eq!(group.len(), 0);
}

#[test]
fn test_minimum_of_empty_group_is_argument() {
    let group = SequenceGroup::new();
    assert_eq!(group.minimum_sequence(7), 7);
    assert_eq!(group.minimum_sequence(-1), -1);
}

#[test]
fn test_add_seeds_to_cursor() {
    let group = SequenceGroup::new();
    let cursor = AtomicSequence::from(42);
    let consumer = Arc::new(AtomicSequence::default());

    group.add(&cursor, &[consumer.clone()]);

    // A freshly attached consumer must not throttle the producer
    // retroactively.
    assert_eq!(consumer.get(), 42);
    assert_eq!(group.len(), 1);
}

#[test]
fn test_minimum_sequence() {
    let group = SequenceGroup::new();
    let cursor = AtomicSequence::default();
    let a = Arc::new(AtomicSequence::default());
    let b = Arc::new(AtomicSequence::default());

    group.add(&cursor, &[a.clone(), b.clone()]);
    a.set(3);
    b.set(9);

    assert_eq!(group.minimum_sequence(Sequence::MAX), 3);
    assert_eq!(group.minimum_sequence(1), 1);
}

#[test]
fn test_remove_returns_membership() {
    let group = SequenceGroup::new();
    let cursor = AtomicSequence::default();
    let a = Arc::new(AtomicSequence::default());
    let b = Arc::new(AtomicSequence::default());

    group.add(&cursor, &[a.clone(), b.clone()]);
    assert_eq!(group.len(), 2);

    assert!(group.remove(&a));
    assert_eq!(group.len(), 1);

    // Second removal finds nothing.
    assert!(!group.remove(&a));
    assert_eq!(group.len(), 1);
}

#[test]
fn test_remove_drops_all_occurrences() {
    let group = SequenceGroup::new();
    let cursor = AtomicSequence::default();
    let a = Arc::new(AtomicSequence::default());

    group.add(&cursor, &[a.clone()]);
    group.add(&cursor, &[a.clone()]);
    assert_eq!(group.len(), 2);

    assert!(group.remove(&a));
    assert!(group.is_empty());
}

#[test]
fn test_add_then_remove_restores_membership() {
    let group = SequenceGroup::new();
    let cursor = AtomicSequence::default();
    let resident = Arc::new(AtomicSequence::default());
    let transient = Arc::new(AtomicSequence::default());

    group.add(&cursor, &[resident.clone()]);
    let before: Vec<_> = group.snapshot().iter().map(Arc::as_ptr).collect();

    group.add(&cursor, &[transient.clone()]);
    assert!(group.remove(&transient));

    let after: Vec<_> = group.snapshot().iter().map(Arc::as_ptr).collect();
    assert_eq!(before, after);
}

#[test]
fn test_snapshot_is_stable() {
    let group = SequenceGroup::new();
    let cursor = AtomicSequence::default();
    let a = Arc::new(AtomicSequence::default());

    group.add(&cursor, &[a.clone()]);
    let snapshot = group.snapshot();

    assert!(group.remove(&a));

    // The earlier snapshot is immutable and unaffected by the removal.
    assert_eq!(snapshot.len(), 1);
    assert!(group.is_empty());
}

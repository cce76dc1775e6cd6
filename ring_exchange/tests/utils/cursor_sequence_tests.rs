// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::sync::Arc;

use ring_exchange::prelude::*;

#[test]
fn test_empty_slice_returns_minimum() {
    let sequences: Vec<Arc<AtomicSequence>> = vec![];
    assert_eq!(min_cursor_sequence(&sequences, 5), 5);
}

#[test]
fn test_returns_smallest_sequence() {
    let sequences = vec![
        Arc::new(AtomicSequence::from(3)),
        Arc::new(AtomicSequence::from(7)),
        Arc::new(AtomicSequence::from(11)),
    ];
    assert_eq!(min_cursor_sequence(&sequences, Sequence::MAX), 3);
}

#[test]
fn test_minimum_argument_caps_result() {
    let sequences = vec![Arc::new(AtomicSequence::from(10))];
    assert_eq!(min_cursor_sequence(&sequences, 2), 2);
}

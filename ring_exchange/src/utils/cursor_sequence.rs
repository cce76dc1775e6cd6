// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

use std::borrow::Borrow;

use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;

/// Returns the minimum over `sequences` and `minimum`.
///
/// The reduction producers run when deciding whether a claim would lap the
/// slowest consumer; `minimum` caps the result when the slice is empty.
pub fn min_cursor_sequence<S: Borrow<AtomicSequence>>(
    sequences: &[S],
    minimum: Sequence,
) -> Sequence {
    sequences
        .iter()
        .map(|s| s.borrow().get())
        .fold(minimum, Sequence::min)
}

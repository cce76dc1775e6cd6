// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

pub mod atomic_sequence;
pub mod sequence_group;

/// Type alias for sequence numbers in the ring.
///
/// Signed so that the pre-publication state can be expressed as
/// [`INITIAL_CURSOR_VALUE`].
pub type Sequence = i64;

/// Value of every sequence before anything has been claimed or published.
pub const INITIAL_CURSOR_VALUE: Sequence = -1;

// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

//! # Atomic Sequence
//!
//! The single shared mutable primitive of the exchange: a monotonically
//! growing 64-bit counter with explicit memory ordering and cache-line
//! isolation.
//!
//! ## Cache-Line Isolation
//!
//! Sequences owned by different threads are the hottest words in the whole
//! system; two of them sharing a cache line destroys throughput. The counter
//! is therefore padded on both sides so that it occupies a line exclusively,
//! regardless of what the allocator places next to it. The line size is
//! architecture-specific:
//! - 128 bytes on aarch64 (two lines are prefetched as a pair)
//! - 64 bytes elsewhere

use std::mem::size_of;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::sequence::{Sequence, INITIAL_CURSOR_VALUE};

#[cfg(target_arch = "aarch64")]
const CACHE_LINE_SIZE: usize = 128;

#[cfg(not(target_arch = "aarch64"))]
const CACHE_LINE_SIZE: usize = 64;

const CACHE_LINE_PADDING: usize = CACHE_LINE_SIZE - size_of::<AtomicI64>();

/// A cache-line-isolated atomic sequence counter.
///
/// Starts at [`INITIAL_CURSOR_VALUE`] (−1, nothing published yet) and only
/// ever grows. Every store is Release, every load is Acquire, so a consumer
/// that observes a cursor value also observes the slot writes that preceded
/// the corresponding publish.
#[repr(align(64))]
pub struct AtomicSequence {
    _pad_left: [u8; CACHE_LINE_PADDING],
    value: AtomicI64,
    _pad_right: [u8; CACHE_LINE_PADDING],
}

impl AtomicSequence {
    /// Atomically loads the current value with Acquire ordering.
    #[inline]
    pub fn get(&self) -> Sequence {
        self.value.load(Ordering::Acquire)
    }

    /// Atomically stores `value` with Release ordering.
    #[inline]
    pub fn set(&self, value: Sequence) {
        self.value.store(value, Ordering::Release);
    }

    /// Atomically stores `value` with sequentially consistent ordering.
    ///
    /// Stronger than [`set`](Self::set): the store is also totally ordered
    /// against producer-side minimum-sequence scans.
    #[inline]
    pub fn set_volatile(&self, value: Sequence) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Atomically replaces `current` with `new` if the counter still holds
    /// `current`.
    ///
    /// Returns `true` if the exchange was successful.
    #[inline]
    pub fn compare_exchange(&self, current: Sequence, new: Sequence) -> bool {
        self.value
            .compare_exchange(current, new, Ordering::SeqCst, Ordering::Acquire)
            .is_ok()
    }

    /// Atomically increments the counter and returns the new value.
    #[inline]
    pub fn increment_and_get(&self) -> Sequence {
        self.add_and_get(1)
    }

    /// Atomically adds `delta` and returns the new value.
    #[inline]
    pub fn add_and_get(&self, delta: Sequence) -> Sequence {
        self.value.fetch_add(delta, Ordering::SeqCst) + delta
    }
}

impl Default for AtomicSequence {
    /// Creates a new sequence holding [`INITIAL_CURSOR_VALUE`].
    fn default() -> Self {
        Self::from(INITIAL_CURSOR_VALUE)
    }
}

impl From<Sequence> for AtomicSequence {
    fn from(value: Sequence) -> Self {
        Self {
            _pad_left: [0; CACHE_LINE_PADDING],
            value: AtomicI64::new(value),
            _pad_right: [0; CACHE_LINE_PADDING],
        }
    }
}

impl From<AtomicSequence> for Sequence {
    fn from(val: AtomicSequence) -> Self {
        val.value.into_inner()
    }
}

// The counter word must sit alone on its cache line; the padding on both
// sides guarantees that independent of neighbouring allocations.
const _: () = assert!(size_of::<AtomicSequence>() >= 2 * CACHE_LINE_SIZE);

// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

mod blocking_wait_strategy;
mod busy_spin_wait_strategy;
mod sleeping_wait_strategy;
mod yielding_wait_strategy;

// Re exports
pub use blocking_wait_strategy::*;
pub use busy_spin_wait_strategy::*;
pub use sleeping_wait_strategy::*;
pub use yielding_wait_strategy::*;

use std::sync::Arc;

use crate::error::Result;
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::sequence::Sequence;
use crate::utils::min_cursor_sequence;

/// A policy for how a consumer idles until a sequence becomes available.
///
/// `wait_for` blocks until the gate — the publisher cursor, or the minimum of
/// the dependent sequences when the consumer runs behind other stages — has
/// reached `sequence`, and returns the maximum gate value observed, which may
/// be larger than requested. Implementations must poll `check_alert` within a
/// bounded quantum and surface [`RingError::Alert`](crate::error::RingError)
/// promptly when it fires.
///
/// `signal_all_when_blocking` is called by publishers after the cursor
/// advances and by barriers when an alert is raised; strategies that park
/// threads use it to wake them, the others ignore it.
pub trait WaitStrategy: Send + Sync + 'static {
    fn new() -> Self;

    fn wait_for<F: Fn() -> bool>(
        &self,
        sequence: Sequence,
        cursor: &AtomicSequence,
        dependents: &[Arc<AtomicSequence>],
        check_alert: F,
    ) -> Result<Sequence>;

    fn signal_all_when_blocking(&self);
}

/// The sequence a waiting consumer is actually gated on: the publisher
/// cursor for a first-stage consumer, the slowest upstream stage otherwise.
#[inline]
pub(crate) fn gate_sequence(cursor: &AtomicSequence, dependents: &[Arc<AtomicSequence>]) -> Sequence {
    if dependents.is_empty() {
        cursor.get()
    } else {
        min_cursor_sequence(dependents, Sequence::MAX)
    }
}

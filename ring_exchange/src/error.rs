// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

//! Error types for ring exchange operations.

use thiserror::Error;

/// Result type alias for ring exchange operations.
pub type Result<T> = std::result::Result<T, RingError>;

/// Error kinds surfaced by the exchange.
///
/// The claim and publish hot paths retry internally where the protocol calls
/// for it; everything else is reported through one of these variants and left
/// to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Construction was rejected; fatal to the ring being built.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong with the requested configuration
        message: String,
    },

    /// A `try_next` style claim could not be satisfied without blocking.
    ///
    /// Recoverable: back off, drop the event or retry later.
    #[error("insufficient capacity in ring buffer")]
    InsufficientCapacity,

    /// A blocked barrier wait was cancelled via [`alert`](crate::barrier::SequenceBarrier::alert).
    ///
    /// The consumer must re-check its lifecycle and either clear the alert
    /// and resume, or exit.
    #[error("sequence barrier alerted")]
    Alert,

    /// An operation was invoked in a state that does not permit it.
    #[error("illegal state: {message}")]
    IllegalState {
        /// Which contract was violated
        message: String,
    },
}

impl RingError {
    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a new illegal state error.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) "2023" . The DeepCausality Authors. All Rights Reserved.

// Re-exports
pub use crate::barrier::*;
pub use crate::consumer::*;
pub use crate::dsl::*;
pub use crate::error::{Result, RingError};
pub use crate::executor::*;
pub use crate::producer::multi_producer::*;
pub use crate::producer::single_producer::*;
pub use crate::producer::{EventProducer, Sequencer};
pub use crate::ringbuffer::*;
pub use crate::sequence::atomic_sequence::*;
pub use crate::sequence::sequence_group::*;
pub use crate::sequence::{Sequence, INITIAL_CURSOR_VALUE};
pub use crate::utils::*;
pub use crate::wait_strategy::*;

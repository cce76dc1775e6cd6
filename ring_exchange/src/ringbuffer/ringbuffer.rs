use std::cell::UnsafeCell;

use crate::error::{Result, RingError};
use crate::ringbuffer::DataProvider;
use crate::sequence::Sequence;

/// Fixed-size slot storage of a ring.
///
/// Every slot is preallocated at construction by invoking the factory once
/// per index; slots are never freed or reallocated, only recycled in place as
/// the sequence counters wrap around the ring. Indexing is
/// `sequence & (buffer_size - 1)`, which is why the size must be a power of
/// two.
///
/// # Safety
///
/// The storage itself enforces nothing; the claim-then-publish protocol does.
/// Only the producer holding sequence `s` writes slot `s`, and no reader
/// reads it before observing the publication of `s`.
#[repr(align(64))] // Align to cache line size
pub struct RingBuffer<E> {
    /// The slot array. UnsafeCell provides the interior mutability the
    /// protocol-serialized access requires.
    slots: Box<[UnsafeCell<E>]>,

    /// Bitmask for fast modulo operations, `buffer_size - 1`.
    mask: usize,
}

impl<E> RingBuffer<E> {
    /// Creates the slot storage, invoking `factory` exactly once per slot.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidConfiguration`] unless `buffer_size` is a
    /// power of two (and therefore at least 1).
    pub fn new<F>(buffer_size: usize, mut factory: F) -> Result<Self>
    where
        F: FnMut() -> E,
    {
        if !buffer_size.is_power_of_two() {
            return Err(RingError::config(format!(
                "buffer size must be a power of two >= 1, got {buffer_size}"
            )));
        }

        let slots = (0..buffer_size)
            .map(|_| UnsafeCell::new(factory()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(RingBuffer {
            slots,
            mask: buffer_size - 1,
        })
    }

    /// Returns the capacity of the ring buffer, always a power of two.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<E> DataProvider<E> for RingBuffer<E>
where
    E: Send + Sync,
{
    #[inline(always)]
    fn buffer_size(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    unsafe fn slot_mut(&self, sequence: Sequence) -> &mut E {
        let index = sequence as usize & self.mask;
        &mut *self.slots.get_unchecked(index).get()
    }

    #[inline(always)]
    unsafe fn slot(&self, sequence: Sequence) -> &E {
        let index = sequence as usize & self.mask;
        &*self.slots.get_unchecked(index).get()
    }
}

unsafe impl<E: Send> Send for RingBuffer<E> {}
unsafe impl<E: Sync> Sync for RingBuffer<E> {}

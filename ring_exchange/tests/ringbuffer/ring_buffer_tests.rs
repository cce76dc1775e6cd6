use ring_exchange::prelude::*;

#[test]
fn test_ring_buffer_creation() {
    let ring_buffer = RingBuffer::new(1024, || 0u64).unwrap();
    assert_eq!(ring_buffer.capacity(), 1024);
    assert_eq!(ring_buffer.buffer_size(), 1024);
}

#[test]
fn test_ring_buffer_rejects_non_power_of_two() {
    let result = RingBuffer::new(7, || 0u64);
    assert!(matches!(
        result,
        Err(RingError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_ring_buffer_rejects_zero_size() {
    let result = RingBuffer::new(0, || 0u64);
    assert!(matches!(
        result,
        Err(RingError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_ring_buffer_size_one_is_valid() {
    let ring_buffer = RingBuffer::new(1, || 0u64).unwrap();
    assert_eq!(ring_buffer.capacity(), 1);
}

#[test]
fn test_factory_invoked_once_per_slot() {
    let mut calls = 0;
    let ring_buffer = RingBuffer::new(8, || {
        calls += 1;
        calls
    })
    .unwrap();

    assert_eq!(calls, 8);

    // Slots hold the factory results in index order.
    unsafe {
        assert_eq!(*ring_buffer.slot(0), 1);
        assert_eq!(*ring_buffer.slot(7), 8);
    }
}

#[test]
fn test_sequence_indexing_wraps() {
    let ring_buffer = RingBuffer::new(8, || 0i64).unwrap();

    unsafe {
        *ring_buffer.slot_mut(3) = 42;
        // Sequence 11 maps onto the same slot one lap later.
        assert_eq!(*ring_buffer.slot(11), 42);
    }
}

use std::{marker::PhantomData, sync::Arc};

use crate::consumer::{BatchEventProcessor, EventHandler, EventHandlerMut, EventProcessorMut};
use crate::error::Result;
use crate::executor::{EventProcessorExecutor, ThreadedExecutor, Worker};
use crate::producer::multi_producer::MultiProducerSequencer;
use crate::producer::single_producer::{Producer, SingleProducerSequencer};
use crate::producer::{EventProducer, Sequencer};
use crate::ringbuffer::{DataProvider, RingBuffer};
use crate::sequence::atomic_sequence::AtomicSequence;
use crate::wait_strategy::{
    BlockingWaitStrategy, BusySpinWaitStrategy, SleepingWaitStrategy, WaitStrategy,
    YieldingWaitStrategy,
};

/// A builder for wiring a complete exchange: storage, wait strategy,
/// producer mode, consumer stages and their dependency barriers.
///
/// # Examples
/// ```
/// use ring_exchange::prelude::*;
///
/// struct PrintHandler;
/// impl EventHandler<u64> for PrintHandler {
///     fn on_event(&self, event: &u64, sequence: i64, _end_of_batch: bool) {
///         println!("Received: {} at sequence {}", event, sequence);
///     }
/// }
///
/// let (executor, producer) = RingExchangeBuilder::with_ring_buffer::<u64>(64)
///     .unwrap()
///     .with_busy_spin_wait()
///     .with_single_producer()
///     .with_barrier(|scope| {
///         scope.handle_events(PrintHandler);
///     })
///     .build();
///
/// let handle = executor.spawn();
/// let values: Vec<u64> = (0..32).collect();
/// producer.write(values, |slot, _, item| {
///     *slot = *item;
/// });
/// producer.drain();
/// handle.join();
/// ```
#[derive(Debug)]
pub struct RingExchangeBuilder {}

/// Builder stage holding the slot storage.
pub struct WithDataProvider<D: DataProvider<T>, T>
where
    T: Send + Sync,
{
    data_provider: Arc<D>,
    _element: PhantomData<T>,
}

/// Builder stage holding storage and wait strategy.
pub struct WithWaitStrategy<W: WaitStrategy, D: DataProvider<T>, T>
where
    T: Send + Sync,
{
    with_data_provider: WithDataProvider<D, T>,
    _wait_strategy: PhantomData<W>,
}

/// Builder stage holding storage, wait strategy and sequencer.
pub struct WithSequencer<S: Sequencer, W: WaitStrategy, D: DataProvider<T>, T>
where
    T: Send + Sync,
{
    with_wait_strategy: WithWaitStrategy<W, D, T>,
    sequencer: S,
}

/// A scope for wiring the consumer stages behind one barrier.
///
/// Every handler registered in the same scope shares the scope's barrier
/// dependencies; the handlers' own cursors become the dependencies of the
/// next scope (and, for the final scope, the producer's gating sequences).
pub struct BarrierScope<S: Sequencer, D: DataProvider<T>, T> {
    sequencer: S,
    data_provider: Arc<D>,
    gating_sequences: Vec<Arc<AtomicSequence>>,
    cursors: Vec<Arc<AtomicSequence>>,
    workers: Vec<Box<dyn Worker>>,
    _element: PhantomData<T>,
}

/// The final builder stage holding every wired consumer stage.
pub struct WithEventHandlers<S: Sequencer, W: WaitStrategy, D: DataProvider<T>, T>
where
    T: Send + Sync,
{
    with_sequencer: WithSequencer<S, W, D, T>,
    workers: Vec<Box<dyn Worker>>,
    gating_sequences: Vec<Arc<AtomicSequence>>,
}

impl RingExchangeBuilder {
    /// Creates a new builder over a custom data provider.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<D: DataProvider<T>, T>(data_provider: Arc<D>) -> WithDataProvider<D, T>
    where
        T: Send + Sync,
    {
        WithDataProvider {
            data_provider,
            _element: Default::default(),
        }
    }

    /// Creates a new builder over ring storage of `buffer_size` slots, each
    /// preallocated with `T::default()`.
    ///
    /// # Errors
    ///
    /// Fails with [`RingError::InvalidConfiguration`](crate::error::RingError)
    /// unless `buffer_size` is a power of two.
    pub fn with_ring_buffer<T>(buffer_size: usize) -> Result<WithDataProvider<RingBuffer<T>, T>>
    where
        T: Default + Send + Sync,
    {
        Ok(Self::new(Arc::new(RingBuffer::new(buffer_size, T::default)?)))
    }
}

impl<D: DataProvider<T>, T> WithDataProvider<D, T>
where
    T: Send + Sync,
{
    /// Configures a custom wait strategy.
    pub fn with_wait_strategy<W: WaitStrategy>(self) -> WithWaitStrategy<W, D, T> {
        WithWaitStrategy {
            with_data_provider: self,
            _wait_strategy: Default::default(),
        }
    }

    /// Condition-variable waiting: lowest CPU use, highest wake-up latency.
    pub fn with_blocking_wait(self) -> WithWaitStrategy<BlockingWaitStrategy, D, T> {
        self.with_wait_strategy()
    }

    /// Spin, then yield, then park with growing timeouts.
    pub fn with_sleeping_wait(self) -> WithWaitStrategy<SleepingWaitStrategy, D, T> {
        self.with_wait_strategy()
    }

    /// Spin briefly, then yield on every further miss.
    pub fn with_yielding_wait(self) -> WithWaitStrategy<YieldingWaitStrategy, D, T> {
        self.with_wait_strategy()
    }

    /// Tight spin: lowest latency, one busy CPU per waiting consumer.
    pub fn with_busy_spin_wait(self) -> WithWaitStrategy<BusySpinWaitStrategy, D, T> {
        self.with_wait_strategy()
    }
}

impl<W: WaitStrategy, D: DataProvider<T>, T> WithWaitStrategy<W, D, T>
where
    T: Send + Sync,
{
    /// Configures a custom sequencer.
    pub fn with_sequencer<S: Sequencer>(self, sequencer: S) -> WithSequencer<S, W, D, T> {
        WithSequencer {
            with_wait_strategy: self,
            sequencer,
        }
    }

    /// Claim protocol for exactly one producing thread.
    pub fn with_single_producer(self) -> WithSequencer<SingleProducerSequencer<W>, W, D, T> {
        let buffer_size = self.with_data_provider.data_provider.buffer_size();
        self.with_sequencer(SingleProducerSequencer::new(buffer_size, W::new()))
    }

    /// Claim protocol tolerating any number of producing threads.
    pub fn with_multi_producer(self) -> WithSequencer<MultiProducerSequencer<W>, W, D, T> {
        let buffer_size = self.with_data_provider.data_provider.buffer_size();
        self.with_sequencer(MultiProducerSequencer::new(buffer_size, W::new()))
    }
}

impl<S, W, D, T> WithSequencer<S, W, D, T>
where
    S: Sequencer,
    W: WaitStrategy,
    D: DataProvider<T> + 'static,
    T: Send + Sync + 'static,
{
    /// Wires consumer stages gated directly on the publisher cursor.
    pub fn with_barrier(
        mut self,
        f: impl FnOnce(&mut BarrierScope<S, D, T>),
    ) -> WithEventHandlers<S, W, D, T> {
        let mut scope = BarrierScope {
            sequencer: self.sequencer,
            data_provider: self
                .with_wait_strategy
                .with_data_provider
                .data_provider
                .clone(),
            gating_sequences: Vec::new(),
            workers: Vec::new(),
            cursors: Vec::new(),
            _element: Default::default(),
        };

        f(&mut scope);
        self.sequencer = scope.sequencer;

        WithEventHandlers {
            with_sequencer: self,
            workers: scope.workers,
            gating_sequences: scope.cursors,
        }
    }
}

impl<S, D, T> BarrierScope<S, D, T>
where
    S: Sequencer,
    D: DataProvider<T> + 'static,
    T: Send + 'static,
{
    /// Adds a consumer stage with an immutable event handler.
    pub fn handle_events<H>(&mut self, handler: H)
    where
        H: EventHandler<T> + Send + 'static,
    {
        self.handle_events_with(BatchEventProcessor::create(handler))
    }

    /// Adds a consumer stage with a mutable event handler.
    pub fn handle_events_mut<H>(&mut self, handler: H)
    where
        H: EventHandlerMut<T> + Send + 'static,
    {
        self.handle_events_with(BatchEventProcessor::create_mut(handler))
    }

    /// Adds a custom event processor to this scope.
    pub fn handle_events_with<E: EventProcessorMut<T>>(&mut self, processor: E) {
        self.cursors.push(processor.cursor());
        let barrier = self.sequencer.create_barrier(&self.gating_sequences);

        let worker = processor.into_worker(barrier, self.data_provider.clone());
        self.workers.push(worker);
    }
}

impl<S, W, D, T> WithEventHandlers<S, W, D, T>
where
    S: Sequencer,
    W: WaitStrategy,
    D: DataProvider<T> + 'static,
    T: Send + Sync + 'static,
{
    /// Opens a further scope whose stages depend on every stage wired so
    /// far; the new stages become the gating set of the ring.
    pub fn with_barrier(mut self, f: impl FnOnce(&mut BarrierScope<S, D, T>)) -> Self {
        let mut scope = BarrierScope {
            gating_sequences: self.gating_sequences.clone(),
            cursors: Vec::new(),
            sequencer: self.with_sequencer.sequencer,
            data_provider: self
                .with_sequencer
                .with_wait_strategy
                .with_data_provider
                .data_provider
                .clone(),
            workers: Vec::new(),
            _element: Default::default(),
        };

        f(&mut scope);
        self.with_sequencer.sequencer = scope.sequencer;
        self.workers.append(&mut scope.workers);
        self.gating_sequences = scope.cursors;

        self
    }

    /// Builds the exchange with the default threaded executor.
    ///
    /// Returns the executor managing the consumer stages and the producer
    /// handle for publishing events.
    pub fn build(self) -> (impl EventProcessorExecutor, impl EventProducer<Item = T>) {
        self.build_with_executor::<ThreadedExecutor>()
    }

    /// Builds the exchange with a custom executor.
    pub fn build_with_executor<E: EventProcessorExecutor>(
        self,
    ) -> (E, impl EventProducer<Item = T>) {
        // The cursors of the final stage throttle the producer.
        self.with_sequencer
            .sequencer
            .add_gating_sequences(&self.gating_sequences);

        let executor = E::with_workers(self.workers);
        let producer = Producer::new(
            self.with_sequencer
                .with_wait_strategy
                .with_data_provider
                .data_provider
                .clone(),
            self.with_sequencer.sequencer,
        );
        (executor, producer)
    }
}

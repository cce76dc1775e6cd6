//! Thread-per-stage executor.
//!
//! Each [`Worker`] gets a dedicated, named OS thread (`ring-consumer-N`), so
//! a stalled stage is identifiable in thread dumps. Workers are `'static`:
//! every stage owns its handler, its barrier and an `Arc` of the storage, so
//! nothing borrows past the spawn.
//!
//! The handle blocks until every worker has exited — explicitly via
//! [`join`](ExecutorHandle::join), which propagates worker panics, or on
//! drop, which only waits.
//!
//! # Examples
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use ring_exchange::prelude::*;
//!
//! struct CounterTask {
//!     counter: Arc<AtomicUsize>,
//! }
//!
//! impl Worker for CounterTask {
//!     fn run(self: Box<Self>) {
//!         self.counter.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let workers: Vec<Box<dyn Worker>> = vec![
//!     Box::new(CounterTask { counter: counter.clone() }),
//!     Box::new(CounterTask { counter: counter.clone() }),
//! ];
//!
//! let handle = ThreadedExecutor::with_workers(workers).spawn();
//! handle.join();
//!
//! assert_eq!(counter.load(Ordering::SeqCst), 2);
//! ```

use std::thread;

use crate::executor::{EventProcessorExecutor, ExecutorHandle, Worker};

/// Runs every worker on its own named OS thread.
pub struct ThreadedExecutor {
    workers: Vec<Box<dyn Worker>>,
}

/// Handle over the spawned consumer threads.
pub struct ThreadedExecutorHandle {
    threads: Vec<thread::JoinHandle<()>>,
}

impl EventProcessorExecutor for ThreadedExecutor {
    type Handle = ThreadedExecutorHandle;

    fn with_workers(workers: Vec<Box<dyn Worker>>) -> Self {
        Self { workers }
    }

    fn spawn(self) -> ThreadedExecutorHandle {
        let threads = self
            .workers
            .into_iter()
            .enumerate()
            .map(|(index, worker)| {
                thread::Builder::new()
                    .name(format!("ring-consumer-{index}"))
                    .spawn(move || worker.run())
                    .expect("failed to spawn consumer thread")
            })
            .collect();

        ThreadedExecutorHandle { threads }
    }
}

impl ExecutorHandle for ThreadedExecutorHandle {
    /// Blocks until every worker has exited; panics if any worker panicked.
    fn join(mut self) {
        for thread in self.threads.drain(..) {
            if thread.join().is_err() {
                panic!("consumer thread panicked");
            }
        }
    }
}

impl Drop for ThreadedExecutorHandle {
    /// Waits for any still-running workers; unlike
    /// [`join`](ExecutorHandle::join) it swallows their panics, since
    /// panicking in a destructor would abort.
    fn drop(&mut self) {
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}

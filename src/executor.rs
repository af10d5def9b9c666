//! Async job executor: a single bounded queue of fire-and-forget background tasks.
//!
//! Modeled on the teacher crate's streaming pipeline workers (`engine::core::run_pipeline`):
//! a bounded `crossbeam_channel`, a dedicated worker thread, and an explicit join on shutdown.
//! One worker keeps post-processing for a given operation FIFO (§5: "the primary PathMap
//! mutation is observable before any post-processing side-effect"), which is also all the
//! backing store's single writer connection could use concurrently anyway.

use crossbeam_channel::{bounded, Sender};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A bounded background-task queue with orderly shutdown.
pub struct Executor {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl Executor {
    /// Spawn a worker consuming jobs from a bounded channel of capacity `queue_capacity`.
    pub fn new(queue_capacity: usize) -> Self {
        let (sender, receiver) = bounded::<Job>(queue_capacity.max(1));
        let worker = std::thread::spawn(move || {
            while let Ok(job) = receiver.recv() {
                job();
            }
        });
        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Enqueue a fire-and-forget job. Blocks if the queue is full (back-pressure, not data loss).
    /// Silently dropped only if the executor has already been closed.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Box::new(job));
        }
    }

    /// Block until every job submitted before this call has finished running.
    /// A test-only synchronization affordance; production callers rely only on the ordering
    /// guarantees of §5, not on this barrier.
    pub fn flush(&self) {
        let (tx, rx) = bounded::<()>(1);
        self.submit(move || {
            let _ = tx.send(());
        });
        let _ = rx.recv();
    }

    /// Drain the queue and join the worker, waiting for any in-flight job to complete.
    /// Individual jobs are not cancellable; this only stops accepting new ones.
    pub fn close(&mut self) {
        self.sender.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.close();
    }
}

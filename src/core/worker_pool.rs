//! Fixed-size worker pool with rendezvous hand-off.
//!
//! Workers are dedicated OS threads draining one shared zero-capacity
//! channel. Because the channel has no buffer, [`WorkerPool::run`] returns
//! only once a worker has taken the item, so submitters are backpressured
//! whenever every worker is busy.
//!
//! # Design Principles
//!
//! - **No polling**: workers block on `recv`
//! - **No buffering**: at most zero items are accepted but not yet started
//! - **Clean shutdown**: dropping the sender unblocks workers naturally
//!
//! # Example
//!
//! ```rust,ignore
//! use concurrency_patterns::core::WorkerPool;
//!
//! let pool = WorkerPool::new(4)?;
//! for name in ["steve", "bob", "mary"] {
//!     pool.run(move || tracing::info!(name, "processing"))?;
//! }
//! pool.shutdown()?;
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::WorkerPoolConfig;
use crate::core::WorkerPoolError;

/// A unit of work executed once by exactly one worker.
///
/// Implemented for every `FnOnce() + Send + 'static` closure.
pub trait Work: Send + 'static {
    /// Run the work item to completion on the calling worker thread.
    fn execute(self: Box<Self>);
}

impl<F> Work for F
where
    F: FnOnce() + Send + 'static,
{
    fn execute(self: Box<Self>) {
        (*self)();
    }
}

type WorkItem = Box<dyn Work>;

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerPoolStats {
    /// Number of worker threads started.
    pub worker_count: usize,
    /// Worker threads still running. Drops below `worker_count` when work
    /// panics and takes its worker down with it.
    pub live_workers: usize,
    /// Items currently executing.
    pub active: u64,
    /// Items accepted by a worker.
    pub submitted: u64,
    /// Items that finished executing.
    pub completed: u64,
}

#[derive(Debug, Default)]
struct WorkerCounters {
    live: AtomicUsize,
    active: AtomicU64,
    submitted: AtomicU64,
    completed: AtomicU64,
}

impl WorkerCounters {
    fn snapshot(&self, worker_count: usize) -> WorkerPoolStats {
        WorkerPoolStats {
            worker_count,
            live_workers: self.live.load(Ordering::Acquire),
            active: self.active.load(Ordering::Relaxed),
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
        }
    }
}

/// Decrements `active` even when the work item unwinds.
struct ActiveGuard<'a>(&'a WorkerCounters);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Marks the worker as exited however its thread ends.
struct LiveGuard<'a> {
    pool: &'a str,
    worker_id: usize,
    counters: &'a WorkerCounters,
}

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::AcqRel);
        if thread::panicking() {
            warn!(pool = %self.pool, worker_id = self.worker_id, "work panicked, worker exiting");
        }
    }
}

/// Worker pool with a fixed number of dedicated threads.
pub struct WorkerPool {
    name: String,
    worker_count: usize,
    /// Task sender. `None` once shutdown has begun.
    work_tx: Mutex<Option<Sender<WorkItem>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<WorkerCounters>,
    shutdown: AtomicBool,
}

impl WorkerPool {
    /// Create a pool with `worker_count` worker threads.
    ///
    /// # Errors
    ///
    /// - `WorkerPoolError::InvalidConfig` if `worker_count` is zero
    /// - `WorkerPoolError::Spawn` if a worker thread cannot be started
    pub fn new(worker_count: usize) -> Result<Self, WorkerPoolError> {
        Self::with_config(WorkerPoolConfig::new().with_worker_count(worker_count))
    }

    /// Create a pool from configuration.
    ///
    /// # Errors
    ///
    /// Same as [`WorkerPool::new`]. Workers already started when a spawn
    /// fails are stopped and joined before returning.
    pub fn with_config(config: WorkerPoolConfig) -> Result<Self, WorkerPoolError> {
        config.validate().map_err(WorkerPoolError::InvalidConfig)?;

        let (work_tx, work_rx) = bounded::<WorkItem>(0);
        let counters = Arc::new(WorkerCounters::default());
        let mut workers = Vec::with_capacity(config.worker_count);

        for worker_id in 0..config.worker_count {
            match spawn_worker(
                &config.name,
                worker_id,
                work_rx.clone(),
                Arc::clone(&counters),
                config.thread_stack_size,
            ) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    error!(pool = %config.name, worker_id, error = %e, "failed to spawn worker thread");
                    drop(work_tx);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(WorkerPoolError::Spawn(e));
                }
            }
        }

        info!(
            pool = %config.name,
            worker_count = config.worker_count,
            "worker pool initialized"
        );

        Ok(Self {
            name: config.name,
            worker_count: config.worker_count,
            work_tx: Mutex::new(Some(work_tx)),
            workers: Mutex::new(workers),
            counters,
            shutdown: AtomicBool::new(false),
        })
    }

    /// Pool name used in log output and thread names.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Current pool statistics.
    #[must_use]
    pub fn stats(&self) -> WorkerPoolStats {
        self.counters.snapshot(self.worker_count)
    }

    /// Hand `work` to a worker, blocking until one accepts it.
    ///
    /// Returning `Ok` means a worker is now executing the item, not merely
    /// that it was queued.
    ///
    /// # Errors
    ///
    /// - `WorkerPoolError::Shutdown` if shutdown has begun
    /// - `WorkerPoolError::NoWorkers` if every worker has exited because
    ///   work panicked
    pub fn run<W: Work>(&self, work: W) -> Result<(), WorkerPoolError> {
        // Clone so the lock is not held while blocked in `send`.
        let sender = self
            .work_tx
            .lock()
            .as_ref()
            .cloned()
            .ok_or(WorkerPoolError::Shutdown)?;

        sender.send(Box::new(work)).map_err(|_| {
            if self.shutdown.load(Ordering::Acquire) {
                WorkerPoolError::Shutdown
            } else {
                WorkerPoolError::NoWorkers
            }
        })?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Stop accepting work and wait for every worker to exit.
    ///
    /// Items already handed to a worker run to completion first.
    ///
    /// # Errors
    ///
    /// Returns `WorkerPoolError::Shutdown` if the pool was already shut down.
    pub fn shutdown(&self) -> Result<(), WorkerPoolError> {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return Err(WorkerPoolError::Shutdown);
        }

        info!(pool = %self.name, "shutting down worker pool");

        // Submitters still holding a cloned sender finish their hand-off
        // before the channel disconnects.
        self.work_tx.lock().take();

        let workers = std::mem::take(&mut *self.workers.lock());
        for (worker_id, handle) in workers.into_iter().enumerate() {
            match handle.join() {
                Ok(()) => debug!(pool = %self.name, worker_id, "worker joined"),
                Err(_) => warn!(pool = %self.name, worker_id, "worker panicked"),
            }
        }

        let stats = self.stats();
        info!(
            pool = %self.name,
            completed = stats.completed,
            "worker pool shut down complete"
        );
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Signal workers to exit but do not join them here.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.work_tx.lock().take();
            debug!(pool = %self.name, "worker pool dropped without shutdown, workers detached");
        }
    }
}

fn spawn_worker(
    pool: &str,
    worker_id: usize,
    work_rx: Receiver<WorkItem>,
    counters: Arc<WorkerCounters>,
    stack_size: Option<usize>,
) -> io::Result<JoinHandle<()>> {
    let mut builder = thread::Builder::new().name(format!("{pool}-{worker_id}"));
    if let Some(bytes) = stack_size {
        builder = builder.stack_size(bytes);
    }

    let pool = pool.to_owned();
    counters.live.fetch_add(1, Ordering::AcqRel);
    let spawn_counters = Arc::clone(&counters);
    let spawned = builder.spawn(move || {
        let _live = LiveGuard {
            pool: &pool,
            worker_id,
            counters: &counters,
        };
        debug!(pool = %pool, worker_id, "worker started");

        // Ends once every sender is dropped and the channel is empty.
        for work in &work_rx {
            counters.active.fetch_add(1, Ordering::Relaxed);
            let active = ActiveGuard(&counters);
            work.execute();
            drop(active);
            counters.completed.fetch_add(1, Ordering::Relaxed);
        }

        debug!(pool = %pool, worker_id, "queue closed, worker exiting");
    });

    if spawned.is_err() {
        spawn_counters.live.fetch_sub(1, Ordering::AcqRel);
    }
    spawned
}

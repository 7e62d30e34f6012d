//! Error types for pool and runner operations.

use thiserror::Error;

/// Boxed error produced by collaborators (resource factories, `close` calls).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by a [`ResourcePool`](crate::core::ResourcePool).
#[derive(Debug, Error)]
pub enum ResourcePoolError {
    /// Pool capacity must be at least one.
    #[error("pool capacity must be greater than 0")]
    InvalidCapacity,
    /// Configuration validation failed for a reason other than capacity.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The resource factory failed while pre-filling the pool.
    #[error("failed to create pooled resource: {0}")]
    Creation(#[source] BoxError),
    /// The pool has been closed.
    #[error("pool has been closed")]
    Closed,
}

/// Errors produced by a [`WorkerPool`](crate::core::WorkerPool).
#[derive(Debug, Error)]
pub enum WorkerPoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The pool has been shut down.
    #[error("pool has been shut down")]
    Shutdown,
    /// Every worker thread exited (work panicked) before shutdown.
    #[error("all workers exited")]
    NoWorkers,
}

/// Errors produced by a [`Runner`](crate::core::Runner).
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The deadline elapsed before every task completed.
    #[error("received timeout")]
    Timeout,
    /// An interrupt was observed between tasks.
    #[error("received interrupt")]
    Interrupted,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The background thread could not be spawned.
    #[error("failed to spawn runner thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl RunnerError {
    /// Whether the run ended because the deadline elapsed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Whether the run ended because an interrupt was requested.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

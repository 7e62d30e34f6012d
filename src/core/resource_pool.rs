//! Bounded pool of expensive, closeable resources.
//!
//! The pool pre-creates `capacity` resources and stores them in a bounded
//! channel. That channel is both the storage and the semaphore: acquiring is a
//! blocking receive, releasing is a non-blocking send. No resource is created
//! after construction, so at most `capacity` resources ever exist.
//!
//! # Example
//!
//! ```rust,ignore
//! use concurrency_patterns::core::{BoxError, Closeable, ResourcePool};
//!
//! struct Connection(u32);
//!
//! impl Closeable for Connection {
//!     fn close(self) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut next_id = 0;
//! let pool = ResourcePool::new(
//!     || {
//!         next_id += 1;
//!         Ok::<_, BoxError>(Connection(next_id))
//!     },
//!     2,
//! )?;
//!
//! let conn = pool.acquire()?;
//! // ... use the connection ...
//! pool.release(conn);
//! pool.close();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::ResourcePoolConfig;
use crate::core::{BoxError, ResourcePoolError};

const DEFAULT_POOL_NAME: &str = "resource-pool";

/// A resource that owns something which must be released explicitly.
pub trait Closeable: Send + 'static {
    /// Close the resource. Failures are reported but never retried.
    fn close(self) -> Result<(), BoxError>;
}

/// Fixed-capacity pool of closeable resources.
///
/// Share it between threads with an `Arc`. Every method takes `&self`.
pub struct ResourcePool<R: Closeable> {
    name: String,
    capacity: usize,
    slots_tx: Sender<R>,
    slots_rx: Receiver<R>,
    /// `Some` while the pool is open. Taking it is the close transition, and
    /// `release` holds this lock while returning a slot so the two never race.
    close_signal: Mutex<Option<Sender<()>>>,
    /// Disconnects when `close_signal` is dropped, waking blocked acquirers.
    closed_rx: Receiver<()>,
    closed: AtomicBool,
}

impl<R: Closeable> ResourcePool<R> {
    /// Create a pool holding `capacity` resources built by `factory`.
    ///
    /// # Errors
    ///
    /// - `ResourcePoolError::InvalidCapacity` if `capacity` is zero
    /// - `ResourcePoolError::Creation` if any factory call fails; resources
    ///   created before the failure are closed first
    pub fn new<F, E>(factory: F, capacity: usize) -> Result<Self, ResourcePoolError>
    where
        F: FnMut() -> Result<R, E>,
        E: Into<BoxError>,
    {
        Self::with_config(ResourcePoolConfig::new(DEFAULT_POOL_NAME, capacity), factory)
    }

    /// Create a pool from configuration.
    ///
    /// # Errors
    ///
    /// Same as [`ResourcePool::new`], plus `ResourcePoolError::InvalidConfig`
    /// when another configuration field fails validation.
    pub fn with_config<F, E>(
        config: ResourcePoolConfig,
        mut factory: F,
    ) -> Result<Self, ResourcePoolError>
    where
        F: FnMut() -> Result<R, E>,
        E: Into<BoxError>,
    {
        if config.capacity == 0 {
            return Err(ResourcePoolError::InvalidCapacity);
        }
        config.validate().map_err(ResourcePoolError::InvalidConfig)?;

        let ResourcePoolConfig { name, capacity } = config;
        let (slots_tx, slots_rx) = bounded(capacity);

        for created in 0..capacity {
            match factory() {
                Ok(resource) => {
                    debug!(pool = %name, slot = created, "created pooled resource");
                    if let Err(rejected) = slots_tx.try_send(resource) {
                        close_resource(&name, rejected.into_inner());
                    }
                }
                Err(e) => {
                    let error: BoxError = e.into();
                    warn!(
                        pool = %name,
                        created,
                        error = %error,
                        "resource factory failed, closing resources created so far"
                    );
                    for resource in slots_rx.try_iter() {
                        close_resource(&name, resource);
                    }
                    return Err(ResourcePoolError::Creation(error));
                }
            }
        }

        let (close_tx, closed_rx) = bounded(0);
        info!(pool = %name, capacity, "resource pool initialized");

        Ok(Self {
            name,
            capacity,
            slots_tx,
            slots_rx,
            close_signal: Mutex::new(Some(close_tx)),
            closed_rx,
            closed: AtomicBool::new(false),
        })
    }

    /// Pool name used in log output.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed number of resources owned by the pool.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resources currently idle in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.slots_rx.len()
    }

    /// Whether [`ResourcePool::close`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Take a resource, blocking until one is released or the pool closes.
    ///
    /// # Errors
    ///
    /// Returns `ResourcePoolError::Closed` if the pool is closed before or
    /// while waiting.
    pub fn acquire(&self) -> Result<R, ResourcePoolError> {
        if self.is_closed() {
            return Err(ResourcePoolError::Closed);
        }

        select! {
            recv(self.slots_rx) -> slot => slot.map_err(|_| ResourcePoolError::Closed),
            recv(self.closed_rx) -> _ => {
                debug!(pool = %self.name, "pool closed while waiting for a resource");
                Err(ResourcePoolError::Closed)
            }
        }
    }

    /// Like [`ResourcePool::acquire`] but gives up after `timeout`.
    ///
    /// Returns `Ok(None)` if no resource became available in time.
    ///
    /// # Errors
    ///
    /// Returns `ResourcePoolError::Closed` if the pool is closed before or
    /// while waiting.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<Option<R>, ResourcePoolError> {
        if self.is_closed() {
            return Err(ResourcePoolError::Closed);
        }

        select! {
            recv(self.slots_rx) -> slot => slot.map(Some).map_err(|_| ResourcePoolError::Closed),
            recv(self.closed_rx) -> _ => Err(ResourcePoolError::Closed),
            default(timeout) => {
                debug!(pool = %self.name, ?timeout, "timed out waiting for a resource");
                Ok(None)
            }
        }
    }

    /// Return a resource to the pool. Never blocks.
    ///
    /// After the pool is closed the resource is closed and discarded instead.
    pub fn release(&self, resource: R) {
        let signal = self.close_signal.lock();
        if signal.is_none() {
            drop(signal);
            debug!(pool = %self.name, "pool closed, closing released resource");
            close_resource(&self.name, resource);
            return;
        }

        match self.slots_tx.try_send(resource) {
            Ok(()) => {}
            Err(TrySendError::Full(resource) | TrySendError::Disconnected(resource)) => {
                drop(signal);
                warn!(
                    pool = %self.name,
                    capacity = self.capacity,
                    "no free slot for released resource, closing it"
                );
                close_resource(&self.name, resource);
            }
        }
    }

    /// Close the pool and every idle resource. Runs once; later calls are no-ops.
    ///
    /// Resources checked out at this point are closed by their `release`.
    /// Close failures are logged and do not stop the remaining closes.
    pub fn close(&self) {
        let idle: Vec<R> = {
            let mut signal = self.close_signal.lock();
            let Some(sender) = signal.take() else {
                debug!(pool = %self.name, "pool already closed");
                return;
            };
            self.closed.store(true, Ordering::Release);
            drop(sender);
            self.slots_rx.try_iter().collect()
        };

        let idle_count = idle.len();
        let failed = idle
            .into_iter()
            .map(|resource| close_resource(&self.name, resource))
            .filter(|closed| !closed)
            .count();

        info!(
            pool = %self.name,
            closed = idle_count - failed,
            failed,
            checked_out = self.capacity.saturating_sub(idle_count),
            "resource pool closed"
        );
    }
}

impl<R: Closeable> Drop for ResourcePool<R> {
    fn drop(&mut self) {
        if !self.is_closed() {
            debug!(pool = %self.name, "resource pool dropped without close, closing");
            self.close();
        }
    }
}

/// Close one resource, logging any failure. Returns whether it closed cleanly.
fn close_resource<R: Closeable>(pool: &str, resource: R) -> bool {
    match resource.close() {
        Ok(()) => true,
        Err(e) => {
            warn!(pool, error = %e, "failed to close resource");
            false
        }
    }
}

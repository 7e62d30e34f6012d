//! # Concurrency Patterns
//!
//! Three small coordination primitives meant to be embedded in larger services.
//!
//! ## ResourcePool - Bounded Sharing
//!
//! A fixed number of expensive, closeable resources (database connections,
//! model handles) created up front. Callers acquire one, blocking while all
//! are checked out, and release it when done. Closing the pool closes every
//! resource exactly once, including ones released after the close.
//!
//! ```rust,ignore
//! use concurrency_patterns::core::ResourcePool;
//!
//! let pool = ResourcePool::new(create_connection, 2)?;
//! let conn = pool.acquire()?;
//! run_query(&conn);
//! pool.release(conn);
//! pool.close();
//! ```
//!
//! ## WorkerPool - Work Distribution with Backpressure
//!
//! A fixed number of worker threads draining a zero-capacity channel.
//! Submitting blocks until a worker accepts the item, so callers slow down
//! naturally when every worker is busy.
//!
//! ```rust,ignore
//! use concurrency_patterns::core::WorkerPool;
//!
//! let pool = WorkerPool::new(2)?;
//! pool.run(|| println!("steve"))?;
//! pool.shutdown()?;
//! ```
//!
//! ## Runner - Deadlines and Interrupts
//!
//! Runs an ordered list of tasks on a background thread and returns when they
//! finish, when the deadline passes, or when an interrupt is observed between
//! tasks. Timeouts and interrupts are separate errors so callers can pick
//! different exit paths.
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use concurrency_patterns::core::Runner;
//! use concurrency_patterns::runtime::ctrl_c_interrupt;
//!
//! let mut runner = Runner::with_interrupt(Duration::from_secs(3), ctrl_c_interrupt()?);
//! runner.add(|id| println!("task #{id}"));
//! runner.start()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core coordination primitives and their error types.
pub mod core;
/// Configuration models for pools and runners.
pub mod config;
/// Builders to construct primitives from configuration.
pub mod builders;
/// Runtime adapters such as OS signal forwarding.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::core::{
    BoxError, Closeable, Interrupt, ResourcePool, ResourcePoolError, Runner, RunnerError, Work,
    WorkerPool, WorkerPoolError, WorkerPoolStats,
};

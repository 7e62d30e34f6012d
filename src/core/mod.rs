//! Core coordination primitives.

pub mod error;
pub mod interrupt;
pub mod resource_pool;
pub mod runner;
pub mod worker_pool;

pub use error::{BoxError, ResourcePoolError, RunnerError, WorkerPoolError};
pub use interrupt::Interrupt;
pub use resource_pool::{Closeable, ResourcePool};
pub use runner::Runner;
pub use worker_pool::{Work, WorkerPool, WorkerPoolStats};

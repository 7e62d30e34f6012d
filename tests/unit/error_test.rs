//! Tests for error types

use concurrency_patterns::core::{ResourcePoolError, RunnerError, WorkerPoolError};
use std::error::Error;
use std::io;

#[test]
fn test_pool_closed_error() {
    let err = ResourcePoolError::Closed;
    assert_eq!(format!("{}", err), "pool has been closed");
}

#[test]
fn test_pool_creation_error_keeps_source() {
    let err = ResourcePoolError::Creation(io::Error::other("connection refused").into());
    assert_eq!(
        format!("{}", err),
        "failed to create pooled resource: connection refused"
    );
    assert_eq!(err.source().unwrap().to_string(), "connection refused");
}

#[test]
fn test_invalid_capacity_error() {
    let err = ResourcePoolError::InvalidCapacity;
    assert_eq!(format!("{}", err), "pool capacity must be greater than 0");
}

#[test]
fn test_worker_pool_errors() {
    assert_eq!(
        format!("{}", WorkerPoolError::Shutdown),
        "pool has been shut down"
    );
    assert_eq!(
        format!("{}", WorkerPoolError::NoWorkers),
        "all workers exited"
    );
    assert_eq!(
        format!("{}", WorkerPoolError::InvalidConfig("worker_count".into())),
        "invalid configuration: worker_count"
    );
}

#[test]
fn test_runner_errors() {
    assert_eq!(format!("{}", RunnerError::Timeout), "received timeout");
    assert_eq!(format!("{}", RunnerError::Interrupted), "received interrupt");

    assert!(RunnerError::Timeout.is_timeout());
    assert!(!RunnerError::Timeout.is_interrupted());
    assert!(RunnerError::Interrupted.is_interrupted());
}

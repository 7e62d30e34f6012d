//! Tests for configuration validation

use concurrency_patterns::config::{
    CoordinationConfig, ResourcePoolConfig, RunnerConfig, WorkerPoolConfig,
};
use concurrency_patterns::config::pool::{RUNNER_TIMEOUT_ENV, WORKER_COUNT_ENV};
use parking_lot::Mutex;
use std::time::Duration;

#[test]
fn test_resource_pool_config_validation() {
    assert!(ResourcePoolConfig::new("db", 2).validate().is_ok());
    assert!(ResourcePoolConfig::new("db", 0).validate().is_err());
}

#[test]
fn test_worker_pool_config_defaults() {
    let cfg = WorkerPoolConfig::new();
    assert_eq!(cfg.worker_count, num_cpus::get());
    assert_eq!(cfg.name, "worker-pool");
    assert!(cfg.thread_stack_size.is_none());
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_worker_pool_config_invalid_worker_count() {
    let cfg = WorkerPoolConfig::new().with_worker_count(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_runner_config_timeout() {
    let cfg = RunnerConfig { timeout_ms: 1500 };
    assert_eq!(cfg.timeout(), Duration::from_millis(1500));
    assert!(cfg.validate().is_ok());
    assert!(RunnerConfig { timeout_ms: 0 }.validate().is_err());
}

#[test]
fn test_coordination_config_from_json() {
    let json = r#"{
        "resource_pools": {
            "postgres": { "capacity": 4 },
            "redis": { "name": "cache", "capacity": 2 }
        },
        "worker_pool": { "name": "inference", "worker_count": 3 },
        "runner": { "timeout_ms": 2500 }
    }"#;

    let cfg = CoordinationConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.resource_pools.len(), 2);
    assert_eq!(cfg.resource_pools["postgres"].capacity, 4);
    assert_eq!(cfg.resource_pools["postgres"].name, "resource-pool");
    assert_eq!(cfg.worker_pool.worker_count, 3);
    assert_eq!(cfg.worker_pool.name, "inference");
    assert_eq!(cfg.runner.timeout_ms, 2500);
}

#[test]
fn test_coordination_config_defaults_from_empty_json() {
    let cfg = CoordinationConfig::from_json_str("{}").unwrap();
    assert!(cfg.resource_pools.is_empty());
    assert_eq!(cfg.worker_pool.worker_count, num_cpus::get());
    assert_eq!(cfg.runner.timeout_ms, 30_000);
}

#[test]
fn test_coordination_config_rejects_invalid_pool() {
    let json = r#"{ "resource_pools": { "broken": { "capacity": 0 } } }"#;
    let err = CoordinationConfig::from_json_str(json).unwrap_err();
    assert!(err.contains("broken"));
}

#[test]
fn test_coordination_config_rejects_bad_json() {
    let err = CoordinationConfig::from_json_str("not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

/// Serializes tests that mutate process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_coordination_env() {
    std::env::remove_var(WORKER_COUNT_ENV);
    std::env::remove_var(RUNNER_TIMEOUT_ENV);
}

#[test]
fn test_coordination_config_from_env_overrides() {
    let _env = ENV_LOCK.lock();
    clear_coordination_env();

    std::env::set_var(WORKER_COUNT_ENV, "7");
    std::env::set_var(RUNNER_TIMEOUT_ENV, " 1234 ");
    let cfg = CoordinationConfig::from_env();
    clear_coordination_env();

    let cfg = cfg.unwrap();
    assert_eq!(cfg.worker_pool.worker_count, 7);
    assert_eq!(cfg.runner.timeout_ms, 1234);
}

#[test]
fn test_coordination_config_from_env_rejects_bad_values() {
    let _env = ENV_LOCK.lock();
    clear_coordination_env();

    std::env::set_var(WORKER_COUNT_ENV, "many");
    let unparsable = CoordinationConfig::from_env();
    std::env::set_var(WORKER_COUNT_ENV, "0");
    let invalid = CoordinationConfig::from_env();
    clear_coordination_env();

    assert!(unparsable.unwrap_err().starts_with(WORKER_COUNT_ENV));
    assert!(invalid.is_err());
}

#[test]
fn test_coordination_config_from_env_defaults() {
    let _env = ENV_LOCK.lock();
    clear_coordination_env();

    let cfg = CoordinationConfig::from_env().unwrap();
    assert_eq!(cfg.worker_pool.worker_count, num_cpus::get());
    assert_eq!(cfg.runner.timeout_ms, 30_000);
}

#[test]
fn test_resource_pool_config_rejects_blank_name() {
    let err = ResourcePoolConfig::new("", 2).validate().unwrap_err();
    assert!(err.contains("name"));
}

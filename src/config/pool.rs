//! Pool and runner configuration structures.

use std::collections::HashMap;
use std::env::{self, VarError};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`WorkerPoolConfig::worker_count`].
pub const WORKER_COUNT_ENV: &str = "COORD_WORKER_COUNT";
/// Environment variable overriding [`RunnerConfig::timeout_ms`].
pub const RUNNER_TIMEOUT_ENV: &str = "COORD_RUNNER_TIMEOUT_MS";

const DEFAULT_RUNNER_TIMEOUT_MS: u64 = 30_000;

/// Resource pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePoolConfig {
    /// Name used in log output.
    #[serde(default = "default_resource_pool_name")]
    pub name: String,
    /// Number of resources created up front; fixed for the pool's lifetime.
    pub capacity: usize,
}

impl ResourcePoolConfig {
    /// Create a configuration with the given name and capacity.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }

    /// Validate pool configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPoolConfig {
    /// Name used in log output and as the worker thread name prefix.
    #[serde(default = "default_worker_pool_name")]
    pub name: String,
    /// Number of worker threads.
    #[serde(default = "num_cpus::get")]
    pub worker_count: usize,
    /// Stack size for each worker thread; the platform default when unset.
    #[serde(default)]
    pub thread_stack_size: Option<usize>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            name: default_worker_pool_name(),
            worker_count: num_cpus::get(),
            thread_stack_size: None,
        }
    }
}

impl WorkerPoolConfig {
    /// Default configuration: one worker per logical CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the pool name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate worker pool configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.thread_stack_size == Some(0) {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }
}

/// Deadline runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Wall-clock budget for a whole run, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_RUNNER_TIMEOUT_MS,
        }
    }
}

impl RunnerConfig {
    /// Configured timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate runner configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root configuration covering every primitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinationConfig {
    /// Map of pool name to resource pool configuration.
    #[serde(default)]
    pub resource_pools: HashMap<String, ResourcePoolConfig>,
    /// Worker pool configuration.
    #[serde(default)]
    pub worker_pool: WorkerPoolConfig,
    /// Runner configuration.
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl CoordinationConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        for (name, pool) in &self.resource_pools {
            pool.validate()
                .map_err(|e| format!("resource pool `{name}` invalid: {e}"))?;
        }
        self.worker_pool
            .validate()
            .map_err(|e| format!("worker pool invalid: {e}"))?;
        self.runner
            .validate()
            .map_err(|e| format!("runner invalid: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from defaults overridden by the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        if let Some(count) = read_env::<usize>(WORKER_COUNT_ENV)? {
            cfg.worker_pool.worker_count = count;
        }
        if let Some(timeout_ms) = read_env::<u64>(RUNNER_TIMEOUT_ENV)? {
            cfg.runner.timeout_ms = timeout_ms;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_env<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("{key}: {e}")),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(format!("{key}: {e}")),
    }
}

fn default_resource_pool_name() -> String {
    "resource-pool".into()
}

fn default_worker_pool_name() -> String {
    "worker-pool".into()
}

//! Builders to construct resource pools from configuration.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::config::{CoordinationConfig, ResourcePoolConfig};
use crate::core::{BoxError, Closeable, ResourcePool, ResourcePoolError};

/// A named pool failed to build.
#[derive(Debug, Error)]
#[error("resource pool `{pool}` failed to build: {source}")]
pub struct BuildError {
    /// Name of the pool that failed.
    pub pool: String,
    /// Underlying pool error.
    #[source]
    pub source: ResourcePoolError,
}

/// Build one resource pool per entry in `cfg.resource_pools`.
///
/// `factory_for` is called once per pool and returns the factory used to
/// fill it. Pools are built in name order; the map key is the pool name.
///
/// # Errors
///
/// Returns the first pool that fails. Pools built before it are closed.
pub fn build_resource_pools<R, FF, F, E>(
    cfg: &CoordinationConfig,
    mut factory_for: FF,
) -> Result<HashMap<String, ResourcePool<R>>, BuildError>
where
    R: Closeable,
    FF: FnMut(&str, &ResourcePoolConfig) -> F,
    F: FnMut() -> Result<R, E>,
    E: Into<BoxError>,
{
    let mut names: Vec<&String> = cfg.resource_pools.keys().collect();
    names.sort();

    let mut pools = HashMap::with_capacity(names.len());
    for name in names {
        let pool_cfg = &cfg.resource_pools[name];
        let factory = factory_for(name, pool_cfg);
        let config = ResourcePoolConfig::new(name.clone(), pool_cfg.capacity);

        match ResourcePool::with_config(config, factory) {
            Ok(pool) => {
                pools.insert(name.clone(), pool);
            }
            Err(source) => {
                warn!(pool = %name, built = pools.len(), "closing pools built so far");
                for pool in pools.values() {
                    pool.close();
                }
                return Err(BuildError {
                    pool: name.clone(),
                    source,
                });
            }
        }
    }

    Ok(pools)
}

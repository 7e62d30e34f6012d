//! Tests for building pools from configuration

use concurrency_patterns::builders::build_resource_pools;
use concurrency_patterns::config::{CoordinationConfig, ResourcePoolConfig};
use concurrency_patterns::core::{BoxError, Closeable, ResourcePoolError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Handle {
    closes: Arc<AtomicUsize>,
}

impl Closeable for Handle {
    fn close(self) -> Result<(), BoxError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn config_with(pools: &[(&str, usize)]) -> CoordinationConfig {
    let mut cfg = CoordinationConfig::default();
    for (name, capacity) in pools {
        cfg.resource_pools
            .insert((*name).to_string(), ResourcePoolConfig::new("ignored", *capacity));
    }
    cfg
}

#[test]
fn test_build_named_pools() {
    let closes = Arc::new(AtomicUsize::new(0));
    let cfg = config_with(&[("db", 2), ("cache", 3)]);

    let pools = build_resource_pools(&cfg, |_, _| {
        let closes = Arc::clone(&closes);
        move || {
            Ok::<_, BoxError>(Handle {
                closes: Arc::clone(&closes),
            })
        }
    })
    .unwrap();

    assert_eq!(pools.len(), 2);
    assert_eq!(pools["db"].capacity(), 2);
    assert_eq!(pools["db"].name(), "db");
    assert_eq!(pools["cache"].available(), 3);

    for pool in pools.values() {
        pool.close();
    }
    assert_eq!(closes.load(Ordering::SeqCst), 5);
}

#[test]
fn test_build_failure_closes_built_pools() {
    let closes = Arc::new(AtomicUsize::new(0));
    // Pools build in name order: "alpha" succeeds, "beta" fails.
    let cfg = config_with(&[("alpha", 2), ("beta", 2)]);

    let result = build_resource_pools(&cfg, |name, _| {
        let closes = Arc::clone(&closes);
        let fail = name == "beta";
        move || {
            if fail {
                return Err::<Handle, BoxError>("beta is down".into());
            }
            Ok(Handle {
                closes: Arc::clone(&closes),
            })
        }
    });

    let err = result.err().unwrap();
    assert_eq!(err.pool, "beta");
    assert!(matches!(err.source, ResourcePoolError::Creation(_)));
    assert_eq!(closes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_build_rejects_zero_capacity() {
    let cfg = config_with(&[("empty", 0)]);
    let result = build_resource_pools(&cfg, |_, _| {
        || {
            Ok::<_, BoxError>(Handle {
                closes: Arc::default(),
            })
        }
    });

    let err = result.err().unwrap();
    assert!(matches!(err.source, ResourcePoolError::InvalidCapacity));
}

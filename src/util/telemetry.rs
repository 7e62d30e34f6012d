//! Telemetry helpers for structured logging.

use tracing_subscriber::EnvFilter;

/// Install a default fmt subscriber driven by `RUST_LOG`, unless the
/// application already installed one.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Like [`init_tracing`], falling back to `directive` when `RUST_LOG` is unset.
pub fn init_tracing_with_default(directive: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

//! Runtime adapters connecting process-level events to the primitives.

#[cfg(feature = "tokio-runtime")]
pub mod signal;

#[cfg(feature = "tokio-runtime")]
pub use signal::{ctrl_c_interrupt, forward_ctrl_c};

//! Ctrl-C forwarding backed by a Tokio signal listener.
//!
//! The listener runs on its own thread with a single-threaded Tokio runtime,
//! so callers do not need to be inside an async context.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::core::Interrupt;

/// How often the listener checks whether its interrupt was consumed.
const MUTE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Create an [`Interrupt`] that is triggered by Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener runtime or thread cannot be created.
pub fn ctrl_c_interrupt() -> io::Result<Interrupt> {
    let interrupt = Interrupt::new();
    forward_ctrl_c(interrupt.clone())?;
    Ok(interrupt)
}

/// Trigger `interrupt` whenever Ctrl-C is received.
///
/// The listener thread exits shortly after the interrupt is consumed and
/// muted, without waiting for another signal. Tokio keeps its process-wide
/// Ctrl-C handler installed once the first listener registers, so later
/// Ctrl-C presses no longer terminate the process by default. Install a
/// fresh listener, or exit explicitly, if that matters to the caller.
///
/// # Errors
///
/// Returns an error if the listener runtime or thread cannot be created.
pub fn forward_ctrl_c(interrupt: Interrupt) -> io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("interrupt-listener".into())
        .spawn(move || {
            runtime.block_on(listen(interrupt));
        })
}

async fn listen(interrupt: Interrupt) {
    let mut mute_check = tokio::time::interval(MUTE_POLL_INTERVAL);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    if !interrupt.trigger() {
                        debug!("interrupt already consumed, listener exiting");
                        break;
                    }
                    info!("interrupt signal received");
                }
                Err(e) => {
                    error!(error = %e, "failed to listen for interrupt signal");
                    break;
                }
            },
            _ = mute_check.tick() => {
                if interrupt.is_muted() {
                    debug!("interrupt consumed, listener exiting");
                    break;
                }
            }
        }
    }
}

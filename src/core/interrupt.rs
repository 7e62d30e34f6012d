//! Injectable interrupt requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle used to ask a [`Runner`](crate::core::Runner) to stop early.
///
/// Clones share state. Any number of triggers collapse into one pending
/// interrupt. Once the runner consumes it, delivery is muted and later
/// triggers are ignored.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    state: Arc<InterruptState>,
}

#[derive(Debug, Default)]
struct InterruptState {
    pending: AtomicBool,
    muted: AtomicBool,
}

impl Interrupt {
    /// Create a handle with no pending interrupt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an interrupt. Returns `false` if delivery has been muted.
    pub fn trigger(&self) -> bool {
        if self.state.muted.load(Ordering::Acquire) {
            return false;
        }
        self.state.pending.store(true, Ordering::Release);
        true
    }

    /// Whether an interrupt is waiting to be observed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.pending.load(Ordering::Acquire)
    }

    /// Whether an interrupt has already been consumed.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.state.muted.load(Ordering::Acquire)
    }

    /// Consume a pending interrupt and mute further delivery.
    pub(crate) fn take(&self) -> bool {
        if self.state.pending.swap(false, Ordering::AcqRel) {
            self.state.muted.store(true, Ordering::Release);
            true
        } else {
            false
        }
    }
}

//! Cancellation token for in-progress tones.
//!
//! A higher-priority event (doorbell ring, tamper alarm) raises the token
//! from another task or an ISR; the emitter polls it between blocks and
//! during pauses and abandons the current pattern.

use core::sync::atomic::{AtomicBool, Ordering};

/// One-shot cancellation request.
///
/// The emitter consumes the request when it observes it, so the next
/// event plays normally without the caller resetting anything.
pub struct CancelToken {
    requested: AtomicBool,
}

impl CancelToken {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Request cancellation of the tone currently playing (or the next one).
    #[inline]
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Consume a pending request. Returns true if one was pending.
    #[inline]
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

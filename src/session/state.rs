//! Shared session state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Write-once cancellation flag shared between the cue sink and the
/// cancellation listener.
///
/// The only datum mutated by one task and read by another within a
/// session. The transition is monotonic (false → true), so atomic
/// visibility is all that is required — no lock.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

//! Cooperative cancellation token.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::CheckError;

/// Shared cancellation flag threaded through every check.
///
/// Clones observe the same flag. Checks poll it at entry and before each
/// subprocess; git invocations in flight are killed when it flips.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(CheckError::Canceled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), CheckError> {
        if self.is_cancelled() {
            Err(CheckError::Canceled)
        } else {
            Ok(())
        }
    }
}

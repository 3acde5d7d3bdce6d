//! Single-slot execution guard.
//!
//! At most one script runs at a time. A second request while the slot is
//! taken is turned away immediately rather than queued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{CanvasError, Result};

/// Busy flag shared between the runner and anyone polling for progress.
#[derive(Debug, Clone, Default)]
pub struct ExecutionGuard {
    busy: Arc<Mutex<bool>>,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot, or fail with `ConcurrencyRejected` if it is taken.
    ///
    /// The slot is released when the returned token is dropped.
    pub fn try_acquire(&self) -> Result<ExecutionToken> {
        let mut busy = lock(&self.busy);
        if *busy {
            return Err(CanvasError::ConcurrencyRejected);
        }
        *busy = true;
        Ok(ExecutionToken {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Whether a run currently holds the slot.
    pub fn is_busy(&self) -> bool {
        *lock(&self.busy)
    }
}

/// Proof of holding the execution slot.
#[derive(Debug)]
pub struct ExecutionToken {
    busy: Arc<Mutex<bool>>,
}

impl Drop for ExecutionToken {
    fn drop(&mut self) {
        *lock(&self.busy) = false;
    }
}

// A panic while holding the lock must not lock out every later run
fn lock(busy: &Mutex<bool>) -> MutexGuard<'_, bool> {
    busy.lock().unwrap_or_else(PoisonError::into_inner)
}

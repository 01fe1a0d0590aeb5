//! Single-flight guard per generated class and cooperative cancellation for batches.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tracks which generated classes have a generate or bind operation in flight.
///
/// Keyed by class name: two containers producing the same class write the same files.
#[derive(Debug, Clone, Default)]
pub struct ContainerLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

impl ContainerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, failing with [`Error::ContainerBusy`] if it is already held
    pub fn try_acquire(&self, key: &str) -> Result<ContainerGuard> {
        let mut held = self.held.lock();
        if !held.insert(key.to_string()) {
            return Err(Error::ContainerBusy(key.to_string()));
        }
        Ok(ContainerGuard {
            held: Arc::clone(&self.held),
            key: key.to_string(),
        })
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.lock().contains(key)
    }
}

/// Releases its claim when dropped
#[derive(Debug)]
pub struct ContainerGuard {
    held: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl ContainerGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        self.held.lock().remove(&self.key);
    }
}

/// Checked between batch items, never in the middle of one
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

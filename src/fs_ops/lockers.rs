//! Cooperative lock-release protocol.
//!
//! Components that keep files open (an active transfer, an index writer) register a
//! [`FileLocker`] so a failed rename can ask them to let go before falling back to a
//! copy. The registry is an explicit value owned by the composing application and
//! shared by `Arc`; there is no process-global instance.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// Something that may hold a file open and can be asked to release it.
pub trait FileLocker: Send + Sync {
    /// Release whatever hold this component has on `path`.
    /// Returns false when nothing was held or the release did not happen.
    fn release_lock(&self, path: &Path) -> bool;
}

/// Ordered, duplicate-free set of lockers. Order of registration is the retry order.
#[derive(Default)]
pub struct LockerRegistry {
    lockers: RwLock<Vec<Arc<dyn FileLocker>>>,
}

impl fmt::Debug for LockerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockerRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl LockerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `locker` unless the same instance is already present.
    /// Returns true if it was added.
    pub fn add(&self, locker: Arc<dyn FileLocker>) -> bool {
        let mut guard = match self.lockers.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.iter().any(|l| same_locker(l, &locker)) {
            trace!("locker already registered; ignoring");
            return false;
        }
        guard.push(locker);
        debug!(count = guard.len(), "file locker registered");
        true
    }

    /// Unregister `locker` (matched by identity). Returns true if it was present.
    pub fn remove(&self, locker: &Arc<dyn FileLocker>) -> bool {
        let mut guard = match self.lockers.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = guard.len();
        guard.retain(|l| !same_locker(l, locker));
        let removed = guard.len() != before;
        if removed {
            debug!(count = guard.len(), "file locker removed");
        }
        removed
    }

    /// Stable copy of the current lockers in registration order.
    /// Later adds/removes do not affect a snapshot already taken.
    pub fn snapshot(&self) -> Vec<Arc<dyn FileLocker>> {
        match self.lockers.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.lockers.read() {
            Ok(g) => g.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identity comparison on the data pointer only; vtable pointers may differ
/// between codegen units for the same object.
fn same_locker(a: &Arc<dyn FileLocker>, b: &Arc<dyn FileLocker>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

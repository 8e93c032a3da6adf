// Process-wide registry of live producer rings

use std::sync::{Arc, Mutex};

use crate::ring::Ring;

/// Set of live producer rings, enumerated by the consumer each round.
///
/// Registration order is preserved; the consumer iterates snapshots in that
/// order, which is the tie-break when rings are otherwise identical.
pub(crate) struct Registry {
    rings: Mutex<Vec<Arc<Ring>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            rings: Mutex::new(Vec::new()),
        }
    }

    /// Add a ring. Called from the producer thread on first submission.
    pub(crate) fn register(&self, ring: Arc<Ring>) {
        self.rings.lock().unwrap().push(ring);
    }

    /// Remove a ring by identity. Idempotent; safe from any thread.
    pub(crate) fn unregister(&self, ring: &Arc<Ring>) {
        self.rings.lock().unwrap().retain(|r| !Arc::ptr_eq(r, ring));
    }

    /// Point-in-time copy of the live set. The strong references keep ring
    /// storage alive for the duration of the caller's round even if a
    /// producer unregisters mid-drain; the lock is released before the
    /// caller starts enumerating.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Ring>> {
        self.rings.lock().unwrap().clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rings.lock().unwrap().len()
    }
}

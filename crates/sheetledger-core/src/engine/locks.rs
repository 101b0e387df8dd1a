use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One mutex per document id, created on first use.
///
/// Serializes appends to the same document within this process. Other
/// processes writing to the same document are not excluded.
#[derive(Default)]
pub struct DocumentLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, doc: &str) -> Arc<Mutex<()>> {
        self.locks.entry(doc.to_string()).or_default().clone()
    }

    /// Forget the mutex of `doc` once no caller holds a handle to it.
    ///
    /// Callers drop their handle from [`lock_for`](Self::lock_for) first.
    pub fn release(&self, doc: &str) {
        self.locks.remove_if(doc, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of documents with a live mutex.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Acquire `lock`, recovering from poisoning; the guarded data is `()`.
pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

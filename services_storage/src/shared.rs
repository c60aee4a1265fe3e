//! Shared storage handle

use crate::storage::AccessStorage;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle serializing access to one storage
///
/// Each [`with`](SharedStorage::with) call runs as one uninterrupted
/// operation, so a cache lookup and the insert that follows it can never
/// interleave with another caller.
#[derive(Debug, Clone)]
pub struct SharedStorage {
    inner: Arc<Mutex<AccessStorage>>,
}

impl SharedStorage {
    pub fn new(storage: AccessStorage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut AccessStorage) -> R) -> R {
        let mut storage = self.inner.lock();
        f(&mut storage)
    }
}

impl From<AccessStorage> for SharedStorage {
    fn from(storage: AccessStorage) -> Self {
        Self::new(storage)
    }
}

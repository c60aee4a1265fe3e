//! Accessor lifecycle contract and shared handles

use crate::error::AccessorResult;
use crate::manager::AccessorHandle;
use core_types::AccessKind;
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

/// Lifecycle of one concrete resource
///
/// An accessor keeps its content in memory between `load`/`create` and
/// `save`. Exactly one of `create` or `load` runs per materialization.
pub trait Accessor: Sized + Send + 'static {
    fn kind(&self) -> AccessKind;

    /// Whether the backing resource exists on its medium
    fn exists(&self) -> AccessorResult<bool>;

    /// Initializes empty content for a resource that does not exist yet
    fn create(&mut self) -> AccessorResult<()>;

    /// Reads existing content from the medium
    fn load(&mut self) -> AccessorResult<()>;

    /// Writes in-memory content to the medium
    fn save(&mut self) -> AccessorResult<()>;

    /// Removes the backing resource and marks the accessor dropped
    fn destroy(&mut self) -> AccessorResult<()>;

    fn is_dropped(&self) -> bool;

    /// Whether content can be copied from `self` into `other`
    fn is_compatible(&self, other: &Self) -> bool;

    /// Duplicates content into `target` without touching `self`
    fn copy_into(&self, target: &mut Self) -> AccessorResult<()>;

    /// Transfers content into `target`; `self` is destroyed afterwards
    fn move_into(&mut self, target: &mut Self) -> AccessorResult<()> {
        self.copy_into(target)
    }

    /// Wraps a shared handle into the closed handle enum
    fn into_handle(shared: AccessorRef<Self>) -> AccessorHandle;
}

/// Shared handle to a live accessor
///
/// Every caller that accesses the same live identifier holds a clone of the
/// same handle, so changes made through one are visible through all.
pub struct AccessorRef<A> {
    inner: Arc<Mutex<A>>,
}

impl<A> AccessorRef<A> {
    pub(crate) fn new(accessor: A) -> Self {
        Self {
            inner: Arc::new(Mutex::new(accessor)),
        }
    }

    /// Locks the accessor for use
    pub fn lock(&self) -> MutexGuard<'_, A> {
        self.inner.lock()
    }

    /// Returns true if both handles refer to the same accessor
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Clone for AccessorRef<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for AccessorRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorRef")
            .field("ptr", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

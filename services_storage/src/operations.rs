//! Storage operations
//!
//! This module defines the operations shared by the storage root and its
//! sub-storage views.

use crate::error::{StorageError, StorageResult};
use crate::substorage::SubStorage;
use accessors::{
    AccessorHandle, AccessorRef, BinaryAccessor, CustomAccessor, JsonAccessor, TextAccessor,
};
use core_types::AccessKind;

fn typed<T>(
    handle: AccessorHandle,
    identifier: &str,
    kind: &str,
    pick: fn(AccessorHandle) -> Option<T>,
) -> StorageResult<T> {
    pick(handle).ok_or_else(|| {
        StorageError::InvalidOperation(format!("'{}' is not accessible as {}", identifier, kind))
    })
}

/// Identifier-addressed storage operations
///
/// Identifiers are colon-delimited; the empty string is the root.
pub trait StorageOperations {
    /// Access an identifier as `kind`
    ///
    /// Loads the resource if it exists and creates it otherwise. Repeated
    /// accesses return the same live accessor.
    fn access(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle>;

    /// Access an identifier that must not exist yet
    fn create(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle>;

    /// Access an identifier that must already exist
    fn open(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle>;

    /// Copy content between two identifiers of the same kind
    fn copy_to(&mut self, from: &str, to: &str) -> StorageResult<()>;

    /// Move content between two identifiers of the same kind
    ///
    /// The target is committed and the source destroyed.
    fn move_to(&mut self, from: &str, to: &str) -> StorageResult<()>;

    /// Destroy a leaf and everything depending on it
    fn drop(&mut self, identifier: &str) -> StorageResult<()>;

    /// Destroy a directory and everything below it
    fn drop_dir(&mut self, identifier: &str) -> StorageResult<()>;

    fn drop_all(&mut self) -> StorageResult<()>;

    /// Commit, then unload from memory
    fn release(&mut self, identifier: &str) -> StorageResult<()>;

    fn release_dir(&mut self, identifier: &str) -> StorageResult<()>;

    fn release_all(&mut self) -> StorageResult<()>;

    /// Persist an identifier and its dependents; the root commits everything
    fn commit(&mut self, identifier: &str) -> StorageResult<()>;

    fn commit_all(&mut self) -> StorageResult<()>;

    /// Kinds registered at an identifier, empty when unregistered
    fn access_kinds(&self, identifier: &str) -> StorageResult<Vec<AccessKind>>;

    /// View scoped below `prefix`
    fn sub_storage(&mut self, prefix: &str) -> StorageResult<SubStorage<'_>>;

    fn access_as_json(&mut self, identifier: &str) -> StorageResult<AccessorRef<JsonAccessor>> {
        let handle = self.access(identifier, AccessKind::Json)?;
        typed(handle, identifier, "json", AccessorHandle::into_json)
    }

    fn access_as_text(&mut self, identifier: &str) -> StorageResult<AccessorRef<TextAccessor>> {
        let handle = self.access(identifier, AccessKind::Text)?;
        typed(handle, identifier, "text", AccessorHandle::into_text)
    }

    fn access_as_binary(&mut self, identifier: &str) -> StorageResult<AccessorRef<BinaryAccessor>> {
        let handle = self.access(identifier, AccessKind::Binary)?;
        typed(handle, identifier, "binary", AccessorHandle::into_binary)
    }

    fn access_as_custom(
        &mut self,
        identifier: &str,
        kind: &str,
    ) -> StorageResult<AccessorRef<CustomAccessor>> {
        let handle = self.access(identifier, AccessKind::Custom(kind.to_string()))?;
        typed(handle, identifier, kind, AccessorHandle::into_custom)
    }

    fn create_as_json(&mut self, identifier: &str) -> StorageResult<AccessorRef<JsonAccessor>> {
        let handle = self.create(identifier, AccessKind::Json)?;
        typed(handle, identifier, "json", AccessorHandle::into_json)
    }

    fn create_as_text(&mut self, identifier: &str) -> StorageResult<AccessorRef<TextAccessor>> {
        let handle = self.create(identifier, AccessKind::Text)?;
        typed(handle, identifier, "text", AccessorHandle::into_text)
    }

    fn create_as_binary(&mut self, identifier: &str) -> StorageResult<AccessorRef<BinaryAccessor>> {
        let handle = self.create(identifier, AccessKind::Binary)?;
        typed(handle, identifier, "binary", AccessorHandle::into_binary)
    }

    fn create_as_custom(
        &mut self,
        identifier: &str,
        kind: &str,
    ) -> StorageResult<AccessorRef<CustomAccessor>> {
        let handle = self.create(identifier, AccessKind::Custom(kind.to_string()))?;
        typed(handle, identifier, kind, AccessorHandle::into_custom)
    }

    fn open_as_json(&mut self, identifier: &str) -> StorageResult<AccessorRef<JsonAccessor>> {
        let handle = self.open(identifier, AccessKind::Json)?;
        typed(handle, identifier, "json", AccessorHandle::into_json)
    }

    fn open_as_text(&mut self, identifier: &str) -> StorageResult<AccessorRef<TextAccessor>> {
        let handle = self.open(identifier, AccessKind::Text)?;
        typed(handle, identifier, "text", AccessorHandle::into_text)
    }

    fn open_as_binary(&mut self, identifier: &str) -> StorageResult<AccessorRef<BinaryAccessor>> {
        let handle = self.open(identifier, AccessKind::Binary)?;
        typed(handle, identifier, "binary", AccessorHandle::into_binary)
    }

    fn open_as_custom(
        &mut self,
        identifier: &str,
        kind: &str,
    ) -> StorageResult<AccessorRef<CustomAccessor>> {
        let handle = self.open(identifier, AccessKind::Custom(kind.to_string()))?;
        typed(handle, identifier, kind, AccessorHandle::into_custom)
    }
}

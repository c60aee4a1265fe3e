//! Accessor managers
//!
//! An [`AccessorManager`] owns one accessor for one identifier and records
//! the identifiers that depend on it. The orchestrator stores managers behind
//! the object-safe [`ManagedAccessor`] trait so every kind shares one cache.
//!
//! ## Lifecycle
//!
//! - `commit` and `destroy` are idempotent
//! - `commit` after `destroy` is a no-op
//! - `move_to` copies, commits the target, then destroys `self`

use crate::accessor::{Accessor, AccessorRef};
use crate::binary::BinaryAccessor;
use crate::custom::CustomAccessor;
use crate::directory::DirectoryAccessor;
use crate::error::{AccessorError, AccessorResult};
use crate::json::JsonAccessor;
use crate::text::TextAccessor;
use core_types::{AccessKind, AccessorId, Identifier};
use std::any::Any;
use std::collections::BTreeSet;

/// Handle returned to callers of an untyped access
#[derive(Debug, Clone)]
pub enum AccessorHandle {
    Root,
    Directory(AccessorRef<DirectoryAccessor>),
    Json(AccessorRef<JsonAccessor>),
    Text(AccessorRef<TextAccessor>),
    Binary(AccessorRef<BinaryAccessor>),
    Custom(AccessorRef<CustomAccessor>),
}

impl AccessorHandle {
    pub fn kind(&self) -> AccessKind {
        match self {
            AccessorHandle::Root | AccessorHandle::Directory(_) => AccessKind::Directory,
            AccessorHandle::Json(_) => AccessKind::Json,
            AccessorHandle::Text(_) => AccessKind::Text,
            AccessorHandle::Binary(_) => AccessKind::Binary,
            AccessorHandle::Custom(custom) => custom.lock().kind(),
        }
    }

    pub fn into_json(self) -> Option<AccessorRef<JsonAccessor>> {
        match self {
            AccessorHandle::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<AccessorRef<TextAccessor>> {
        match self {
            AccessorHandle::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_binary(self) -> Option<AccessorRef<BinaryAccessor>> {
        match self {
            AccessorHandle::Binary(binary) => Some(binary),
            _ => None,
        }
    }

    pub fn into_custom(self) -> Option<AccessorRef<CustomAccessor>> {
        match self {
            AccessorHandle::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    pub fn into_directory(self) -> Option<AccessorRef<DirectoryAccessor>> {
        match self {
            AccessorHandle::Directory(directory) => Some(directory),
            _ => None,
        }
    }
}

/// Object-safe view of an [`AccessorManager`]
pub trait ManagedAccessor: Send {
    fn accessor_id(&self) -> AccessorId;

    fn kind(&self) -> AccessKind;

    fn exists(&self) -> AccessorResult<bool>;

    fn create(&mut self) -> AccessorResult<()>;

    fn load(&mut self) -> AccessorResult<()>;

    /// Persists content; a no-op once dropped
    fn commit(&mut self) -> AccessorResult<()>;

    /// Destroys the backing resource; a no-op once dropped
    fn destroy(&mut self) -> AccessorResult<()>;

    fn is_dropped(&self) -> bool;

    /// True only for managers of the same concrete kind whose accessors agree
    fn is_compatible(&self, other: &dyn ManagedAccessor) -> bool;

    /// Duplicates content into `target`
    fn copy_to(&self, target: &dyn ManagedAccessor) -> AccessorResult<()>;

    /// Transfers content into `target`, commits it, then destroys `self`
    fn move_to(&mut self, target: &mut dyn ManagedAccessor) -> AccessorResult<()>;

    /// Identifiers whose lifetime is bound to this one
    fn dependents(&self) -> &BTreeSet<Identifier>;

    fn add_dependent(&mut self, child: Identifier);

    fn remove_dependent(&mut self, child: &Identifier);

    /// Identifier this one depends on
    fn parent(&self) -> Option<&Identifier>;

    fn set_parent(&mut self, parent: Identifier);

    fn handle(&self) -> AccessorHandle;

    fn as_any(&self) -> &dyn Any;
}

/// Lifecycle wrapper around one accessor
pub struct AccessorManager<A: Accessor> {
    id: AccessorId,
    accessor: AccessorRef<A>,
    dependents: BTreeSet<Identifier>,
    parent: Option<Identifier>,
}

impl<A: Accessor> AccessorManager<A> {
    pub fn new(accessor: A) -> Self {
        Self {
            id: AccessorId::new(),
            accessor: AccessorRef::new(accessor),
            dependents: BTreeSet::new(),
            parent: None,
        }
    }

    pub fn accessor(&self) -> &AccessorRef<A> {
        &self.accessor
    }

    fn peer<'a>(&self, other: &'a dyn ManagedAccessor) -> AccessorResult<&'a Self> {
        let peer = other
            .as_any()
            .downcast_ref::<Self>()
            .ok_or_else(|| AccessorError::Unsupported(format!("{} transfer", other.kind())))?;
        if peer.accessor.ptr_eq(&self.accessor) {
            return Err(AccessorError::Unsupported("self transfer".to_string()));
        }
        Ok(peer)
    }
}

impl<A: Accessor> ManagedAccessor for AccessorManager<A> {
    fn accessor_id(&self) -> AccessorId {
        self.id
    }

    fn kind(&self) -> AccessKind {
        self.accessor.lock().kind()
    }

    fn exists(&self) -> AccessorResult<bool> {
        self.accessor.lock().exists()
    }

    fn create(&mut self) -> AccessorResult<()> {
        self.accessor.lock().create()
    }

    fn load(&mut self) -> AccessorResult<()> {
        self.accessor.lock().load()
    }

    fn commit(&mut self) -> AccessorResult<()> {
        let mut accessor = self.accessor.lock();
        if accessor.is_dropped() {
            return Ok(());
        }
        accessor.save()
    }

    fn destroy(&mut self) -> AccessorResult<()> {
        let mut accessor = self.accessor.lock();
        if accessor.is_dropped() {
            return Ok(());
        }
        accessor.destroy()
    }

    fn is_dropped(&self) -> bool {
        self.accessor.lock().is_dropped()
    }

    fn is_compatible(&self, other: &dyn ManagedAccessor) -> bool {
        match self.peer(other) {
            Ok(peer) => self.accessor.lock().is_compatible(&peer.accessor.lock()),
            Err(_) => false,
        }
    }

    fn copy_to(&self, target: &dyn ManagedAccessor) -> AccessorResult<()> {
        let peer = self.peer(target)?;
        let source = self.accessor.lock();
        let mut destination = peer.accessor.lock();
        source.copy_into(&mut destination)
    }

    fn move_to(&mut self, target: &mut dyn ManagedAccessor) -> AccessorResult<()> {
        {
            let peer = self.peer(&*target)?;
            let mut source = self.accessor.lock();
            let mut destination = peer.accessor.lock();
            source.move_into(&mut destination)?;
        }
        target.commit()?;
        self.destroy()
    }

    fn dependents(&self) -> &BTreeSet<Identifier> {
        &self.dependents
    }

    fn add_dependent(&mut self, child: Identifier) {
        self.dependents.insert(child);
    }

    fn remove_dependent(&mut self, child: &Identifier) {
        self.dependents.remove(child);
    }

    fn parent(&self) -> Option<&Identifier> {
        self.parent.as_ref()
    }

    fn set_parent(&mut self, parent: Identifier) {
        self.parent = Some(parent);
    }

    fn handle(&self) -> AccessorHandle {
        A::into_handle(self.accessor.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

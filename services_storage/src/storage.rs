//! Storage orchestrator
//!
//! [`AccessStorage`] owns the live accessor cache and reacts to the access
//! controller's hooks. Every live identifier except the root was reached
//! through its parent directory, so the dependency edges form a forest rooted
//! at `""` and cascades walk it children first.

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::events::{Listeners, StorageEvent};
use crate::kind_cache::KindCache;
use crate::operations::StorageOperations;
use crate::substorage::SubStorage;
use access_control::{AccessHooks, AccessMode, StorageAccessControl, TransferMode};
use access_tree::{AccessSpec, AccessTree};
use accessors::{
    AccessorHandle, AccessorManager, BinaryAccessor, CustomAccessEvent, CustomAccessor,
    DirectoryAccessor, FsBackend, JsonAccessor, ManagedAccessor, MemoryBackend, RootAccessor,
    StorageBackend, TextAccessor,
};
use core_types::{AccessKind, Identifier};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Path-addressed storage with typed accessors
pub struct AccessStorage {
    control: StorageAccessControl,
    state: StorageState,
}

impl AccessStorage {
    /// Disk storage rooted at `root`, with a persisted kind-cache
    pub fn open_dir(root: impl Into<PathBuf>) -> Self {
        Self::with_config(StorageConfig::on_disk(root))
    }

    /// Memory storage without a persisted kind-cache
    pub fn in_memory() -> Self {
        Self::with_config(StorageConfig::in_memory())
    }

    pub fn with_config(config: StorageConfig) -> Self {
        let cache = config.cache_enabled();
        match config.root {
            Some(root) => {
                let mut backend = FsBackend::new(root);
                if let Some(path) = config.cache_path {
                    backend = backend.with_cache_path(path);
                }
                Self::with_backend(backend, cache)
            }
            None => Self::with_backend(MemoryBackend::new(), cache),
        }
    }

    pub fn with_backend(backend: impl StorageBackend + 'static, cache: bool) -> Self {
        let kinds = if cache {
            KindCache::load(backend.kind_cache())
        } else {
            KindCache::disabled()
        };

        let mut live: BTreeMap<Identifier, Box<dyn ManagedAccessor>> = BTreeMap::new();
        live.insert(
            Identifier::root(),
            Box::new(AccessorManager::new(RootAccessor)),
        );

        Self {
            control: StorageAccessControl::new(),
            state: StorageState {
                backend: Box::new(backend),
                live,
                kinds,
                plugins: BTreeMap::new(),
                listeners: Listeners::default(),
            },
        }
    }

    /// Replaces the registered tree
    ///
    /// Live accessors are kept; callers release them first when the tree
    /// changes shape.
    pub fn register(&mut self, tree: AccessTree) -> StorageResult<()> {
        self.control.register(tree)?;
        tracing::debug!("registered access tree");
        Ok(())
    }

    /// Registers the event table for a custom kind
    pub fn add_access_event(
        &mut self,
        kind: impl Into<String>,
        events: Arc<dyn CustomAccessEvent>,
    ) -> StorageResult<()> {
        let kind = kind.into();
        if !AccessKind::from(kind.as_str()).is_custom() {
            return Err(StorageError::InvalidOperation(format!(
                "'{}' is a built-in kind",
                kind
            )));
        }
        self.state.plugins.insert(kind, events);
        Ok(())
    }

    pub fn add_listener(&mut self, listener: impl Fn(&StorageEvent) + Send + Sync + 'static) {
        self.state.listeners.add(listener);
    }

    /// Whether `identifier` has a live accessor
    pub fn is_live(&self, identifier: &str) -> bool {
        Identifier::parse(identifier)
            .map(|identifier| self.state.live.contains_key(&identifier))
            .unwrap_or(false)
    }

    /// Live identifiers, excluding the root
    pub fn live_identifiers(&self) -> Vec<Identifier> {
        self.state
            .live
            .keys()
            .filter(|identifier| !identifier.is_root())
            .cloned()
            .collect()
    }

    /// Identifiers reached through `identifier`
    pub fn dependents(&self, identifier: &str) -> StorageResult<Vec<Identifier>> {
        let identifier = Identifier::parse(identifier)?;
        Ok(self
            .state
            .live
            .get(&identifier)
            .map(|manager| manager.dependents().iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Kind recorded in the kind-cache
    pub fn cached_kind(&self, identifier: &str) -> StorageResult<Option<AccessKind>> {
        let identifier = Identifier::parse(identifier)?;
        Ok(self.state.kinds.get(&identifier).cloned())
    }

    fn access_with(
        &mut self,
        identifier: &str,
        kind: AccessKind,
        mode: AccessMode,
    ) -> StorageResult<AccessorHandle> {
        let identifier = Identifier::parse(identifier)?;
        self.control
            .access(&mut self.state, &identifier, &kind, mode)
    }

    /// Kind the source of a transfer is accessed as
    fn source_kind(&self, identifier: &Identifier) -> StorageResult<AccessKind> {
        if let Some(manager) = self.state.live.get(identifier) {
            return Ok(manager.kind());
        }
        if let Some(kind) = self.state.kinds.get(identifier) {
            return Ok(kind.clone());
        }
        self.control
            .access_kinds(identifier)
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::NotRegistered(identifier.to_string()))
    }

    fn transfer(&mut self, from: &str, to: &str, mode: TransferMode) -> StorageResult<()> {
        let from = Identifier::parse(from)?;
        let to = Identifier::parse(to)?;
        if from.is_within(&to) || to.is_within(&from) {
            return Err(StorageError::InvalidOperation(format!(
                "Cannot transfer '{}' onto '{}'",
                from, to
            )));
        }

        let kind = self.source_kind(&from)?;
        if let Some(cached) = self.state.kinds.get(&to) {
            if cached != &kind {
                return Err(StorageError::UncompatibleAccessor {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        self.state.commit_live(&from)?;
        match mode {
            TransferMode::Copy => self.control.copy_to(&mut self.state, &from, &to, &kind)?,
            TransferMode::Move => self.control.move_to(&mut self.state, &from, &to, &kind)?,
        }
        self.state.kinds.flush()
    }
}

impl StorageOperations for AccessStorage {
    fn access(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle> {
        self.access_with(identifier, kind, AccessMode::Access)
    }

    fn create(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle> {
        self.access_with(identifier, kind, AccessMode::Create)
    }

    fn open(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle> {
        self.access_with(identifier, kind, AccessMode::Open)
    }

    fn copy_to(&mut self, from: &str, to: &str) -> StorageResult<()> {
        self.transfer(from, to, TransferMode::Copy)
    }

    fn move_to(&mut self, from: &str, to: &str) -> StorageResult<()> {
        self.transfer(from, to, TransferMode::Move)
    }

    fn drop(&mut self, identifier: &str) -> StorageResult<()> {
        let identifier = Identifier::parse(identifier)?;
        self.control.destroy(&mut self.state, &identifier)?;
        self.state.kinds.flush()
    }

    fn drop_dir(&mut self, identifier: &str) -> StorageResult<()> {
        let identifier = Identifier::parse(identifier)?;
        self.control.destroy_dir(&mut self.state, &identifier)?;
        self.state.kinds.flush()
    }

    fn drop_all(&mut self) -> StorageResult<()> {
        self.drop_dir("")
    }

    fn release(&mut self, identifier: &str) -> StorageResult<()> {
        let identifier = Identifier::parse(identifier)?;
        if identifier.is_root() {
            return Err(StorageError::InvalidOperation(
                "Cannot release the root directory. use release_all() instead.".to_string(),
            ));
        }
        if self.control.access_kinds(&identifier).is_empty() {
            return Err(StorageError::NotRegistered(identifier.to_string()));
        }
        self.state.release_live(&identifier)?;
        self.state.kinds.flush()
    }

    fn release_dir(&mut self, identifier: &str) -> StorageResult<()> {
        let identifier = Identifier::parse(identifier)?;
        self.control.validate_directory(&identifier)?;
        self.state.release_live(&identifier)?;
        self.state.kinds.flush()
    }

    fn release_all(&mut self) -> StorageResult<()> {
        self.release_dir("")
    }

    fn commit(&mut self, identifier: &str) -> StorageResult<()> {
        let identifier = Identifier::parse(identifier)?;
        if self.control.access_kinds(&identifier).is_empty() {
            return Err(StorageError::NotRegistered(identifier.to_string()));
        }
        self.state.commit_live(&identifier)?;
        self.state.kinds.flush()
    }

    fn commit_all(&mut self) -> StorageResult<()> {
        self.commit("")
    }

    fn access_kinds(&self, identifier: &str) -> StorageResult<Vec<AccessKind>> {
        let identifier = Identifier::parse(identifier)?;
        Ok(self.control.access_kinds(&identifier))
    }

    fn sub_storage(&mut self, prefix: &str) -> StorageResult<SubStorage<'_>> {
        let prefix = Identifier::parse(prefix)?;
        SubStorage::new(self, prefix)
    }
}

impl fmt::Debug for AccessStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessStorage")
            .field("live", &self.state.live.keys().collect::<Vec<_>>())
            .field("kinds", &self.state.kinds)
            .field("plugins", &self.state.plugins.keys().collect::<Vec<_>>())
            .field("listeners", &self.state.listeners)
            .finish()
    }
}

/// Everything the hooks mutate, kept apart from the controller
struct StorageState {
    backend: Box<dyn StorageBackend>,
    live: BTreeMap<Identifier, Box<dyn ManagedAccessor>>,
    kinds: KindCache,
    plugins: BTreeMap<String, Arc<dyn CustomAccessEvent>>,
    listeners: Listeners,
}

impl StorageState {
    fn build(
        &self,
        identifier: &Identifier,
        spec: &AccessSpec,
    ) -> StorageResult<Box<dyn ManagedAccessor>> {
        let manager: Box<dyn ManagedAccessor> = match spec {
            AccessSpec::Text => Box::new(AccessorManager::new(TextAccessor::new(
                self.backend.content(identifier),
            ))),
            AccessSpec::Binary => Box::new(AccessorManager::new(BinaryAccessor::new(
                self.backend.content(identifier),
            ))),
            AccessSpec::Json(schema) => Box::new(AccessorManager::new(JsonAccessor::new(
                self.backend.content(identifier),
                schema.clone(),
            ))),
            AccessSpec::Directory(tree) => Box::new(AccessorManager::new(DirectoryAccessor::new(
                self.backend.directory(identifier),
                tree.clone(),
            ))),
            AccessSpec::Custom { id, args } => {
                let events = self.plugins.get(id).cloned().ok_or_else(|| {
                    StorageError::InvalidOperation(format!(
                        "Accessor event '{}' is not registered",
                        id
                    ))
                })?;
                Box::new(AccessorManager::new(CustomAccessor::init(
                    id.clone(),
                    args.clone(),
                    self.backend.location(identifier),
                    events,
                )?))
            }
            AccessSpec::Nothing => {
                return Err(StorageError::AccessDenied {
                    identifier: identifier.to_string(),
                    kind: AccessKind::Nothing,
                })
            }
            AccessSpec::Union(_) => {
                return Err(StorageError::InvalidOperation(format!(
                    "No alternative selected for '{}'",
                    identifier
                )))
            }
        };
        Ok(manager)
    }

    fn children(&self, identifier: &Identifier) -> Vec<Identifier> {
        self.live
            .get(identifier)
            .map(|manager| manager.dependents().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Removes a live manager and its edge from the parent
    fn unlink(&mut self, identifier: &Identifier) -> Option<Box<dyn ManagedAccessor>> {
        let manager = self.live.remove(identifier)?;
        if let Some(parent) = manager.parent() {
            if let Some(parent) = self.live.get_mut(parent) {
                parent.remove_dependent(identifier);
            }
        }
        Some(manager)
    }

    /// Unloads every live descendant without committing it
    fn forget_dependents(&mut self, identifier: &Identifier) {
        for child in self.children(identifier) {
            self.forget_dependents(&child);
            self.unlink(&child);
            self.kinds.remove(&child);
        }
    }

    fn commit_live(&mut self, identifier: &Identifier) -> StorageResult<()> {
        for child in self.children(identifier) {
            self.commit_live(&child)?;
        }
        if let Some(manager) = self.live.get_mut(identifier) {
            manager.commit()?;
            tracing::debug!(%identifier, "committed");
        }
        Ok(())
    }

    fn release_live(&mut self, identifier: &Identifier) -> StorageResult<()> {
        for child in self.children(identifier) {
            self.release_live(&child)?;
        }
        if identifier.is_root() {
            return Ok(());
        }
        if let Some(manager) = self.live.get_mut(identifier) {
            manager.commit()?;
            self.unlink(identifier);
            self.kinds.remove(identifier);
            tracing::debug!(%identifier, "released");
        }
        Ok(())
    }

    fn destroy_live(&mut self, identifier: &Identifier) -> StorageResult<()> {
        for child in self.children(identifier) {
            self.destroy_live(&child)?;
        }

        if identifier.is_root() {
            self.backend.directory(identifier).remove()?;
            self.kinds.remove_within(identifier);
            tracing::debug!("dropped every resource");
            return Ok(());
        }

        if let Some(manager) = self.live.get_mut(identifier) {
            manager.destroy()?;
            self.unlink(identifier);
            self.kinds.remove_within(identifier);
            self.listeners.emit(StorageEvent::Destroy {
                identifier: identifier.clone(),
            });
            tracing::debug!(%identifier, "dropped");
        }
        Ok(())
    }

    fn live_pair(
        &self,
        from: &Identifier,
        to: &Identifier,
    ) -> StorageResult<(&dyn ManagedAccessor, &dyn ManagedAccessor)> {
        match (self.live.get(from), self.live.get(to)) {
            (Some(source), Some(target)) => Ok((&**source, &**target)),
            _ => Err(StorageError::InvalidOperation(format!(
                "Cannot transfer '{}' onto '{}'",
                from, to
            ))),
        }
    }
}

impl AccessHooks for StorageState {
    type Handle = AccessorHandle;
    type Error = StorageError;

    fn on_access(
        &mut self,
        identifier: &Identifier,
        spec: &AccessSpec,
        mode: AccessMode,
    ) -> StorageResult<AccessorHandle> {
        if matches!(self.live.get(identifier), Some(manager) if manager.is_dropped()) {
            self.unlink(identifier);
        }

        if let Some(manager) = self.live.get(identifier) {
            if mode == AccessMode::Create {
                return Err(StorageError::InvalidOperation(format!(
                    "File '{}' already exists in memory",
                    identifier
                )));
            }
            let kind = manager.kind();
            if spec.kind().as_ref() != Some(&kind) {
                return Err(StorageError::InvalidOperation(format!(
                    "'{}' is already accessed as '{}'",
                    identifier, kind
                )));
            }
            tracing::trace!(%identifier, "accessor cache hit");
            let handle = manager.handle();
            self.listeners.emit(StorageEvent::Access {
                identifier: identifier.clone(),
                kind,
                accessor: manager.accessor_id(),
            });
            return Ok(handle);
        }

        let mut manager = self.build(identifier, spec)?;
        let exists = manager.exists()?;
        match mode {
            AccessMode::Create if exists => {
                return Err(StorageError::InvalidOperation(format!(
                    "File '{}' already exists",
                    identifier
                )))
            }
            AccessMode::Open if !exists => {
                return Err(StorageError::InvalidOperation(format!(
                    "File '{}' does not exist",
                    identifier
                )))
            }
            _ => {}
        }

        if exists {
            manager.load()?;
        } else {
            manager.create()?;
        }

        let kind = manager.kind();
        let handle = manager.handle();
        let accessor = manager.accessor_id();
        tracing::debug!(%identifier, %kind, created = !exists, "materialized accessor");

        self.live.insert(identifier.clone(), manager);
        self.kinds.insert(identifier.clone(), kind.clone());
        self.listeners.emit(StorageEvent::Access {
            identifier: identifier.clone(),
            kind,
            accessor,
        });
        Ok(handle)
    }

    fn on_chain_dependency(&mut self, parent: &Identifier, child: &Identifier) {
        if let Some(manager) = self.live.get_mut(parent) {
            manager.add_dependent(child.clone());
        }
        if let Some(manager) = self.live.get_mut(child) {
            manager.set_parent(parent.clone());
        }
        tracing::trace!(%parent, %child, "dependency edge");
    }

    fn is_compatible(&self, from: &Identifier, to: &Identifier) -> bool {
        self.live_pair(from, to)
            .map(|(source, target)| source.is_compatible(target))
            .unwrap_or(false)
    }

    fn on_transfer(
        &mut self,
        from: &Identifier,
        to: &Identifier,
        mode: TransferMode,
    ) -> StorageResult<()> {
        self.forget_dependents(to);

        match mode {
            TransferMode::Copy => {
                let (source, target) = self.live_pair(from, to)?;
                source.copy_to(target)?;
            }
            TransferMode::Move => {
                let mut source = self.live.remove(from).ok_or_else(|| {
                    StorageError::InvalidOperation(format!("'{}' is not live", from))
                })?;
                let moved = match self.live.get_mut(to) {
                    Some(target) => source.move_to(&mut **target).map_err(StorageError::from),
                    None => Err(StorageError::InvalidOperation(format!(
                        "'{}' is not live",
                        to
                    ))),
                };
                self.live.insert(from.clone(), source);
                moved?;
                self.destroy_live(from)?;
            }
        }
        tracing::debug!(%from, %to, ?mode, "transferred");
        Ok(())
    }

    /// Only live accessors are destroyed; a released resource keeps its medium
    fn on_destroy(&mut self, identifier: &Identifier, _spec: &AccessSpec) -> StorageResult<()> {
        if !self.live.contains_key(identifier) {
            tracing::trace!(%identifier, "not live, nothing to drop");
            return Ok(());
        }
        self.destroy_live(identifier)
    }
}

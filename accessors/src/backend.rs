//! Storage backends
//!
//! A backend maps identifiers to media. The orchestrator asks it for a fresh
//! medium every time an identifier is materialized.

use crate::medium::{ContentMedium, DirectoryMedium, FileMedium, FsDirectory, MemoryStore};
use core_types::Identifier;
use std::path::{Path, PathBuf};

/// Source of backing media
pub trait StorageBackend: Send + Sync {
    /// Medium holding the content at `identifier`
    fn content(&self, identifier: &Identifier) -> Box<dyn ContentMedium>;

    /// Medium holding the directory at `identifier`
    fn directory(&self, identifier: &Identifier) -> Box<dyn DirectoryMedium>;

    /// Filesystem location of `identifier`, if the backend has one
    fn location(&self, identifier: &Identifier) -> Option<PathBuf>;

    /// Medium holding the persisted kind-cache
    fn kind_cache(&self) -> Box<dyn ContentMedium>;
}

/// Backend rooted at a directory on disk
///
/// `a:b:c` maps to `<root>/a/b/c`. The kind-cache lives beside the root as
/// `<root>.kinds.json` unless another path is configured.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
    cache_path: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let cache_path = Self::default_cache_path(&root);
        Self { root, cache_path }
    }

    /// Overrides where the kind-cache is stored
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    fn default_cache_path(root: &Path) -> PathBuf {
        match root.file_name() {
            Some(name) => {
                let mut file = name.to_os_string();
                file.push(".kinds.json");
                root.with_file_name(file)
            }
            None => root.join(".kinds.json"),
        }
    }

    fn path_of(&self, identifier: &Identifier) -> PathBuf {
        identifier
            .segments()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl StorageBackend for FsBackend {
    fn content(&self, identifier: &Identifier) -> Box<dyn ContentMedium> {
        Box::new(FileMedium::new(self.path_of(identifier)))
    }

    fn directory(&self, identifier: &Identifier) -> Box<dyn DirectoryMedium> {
        Box::new(FsDirectory::new(self.path_of(identifier)))
    }

    fn location(&self, identifier: &Identifier) -> Option<PathBuf> {
        Some(self.path_of(identifier))
    }

    fn kind_cache(&self) -> Box<dyn ContentMedium> {
        Box::new(FileMedium::new(self.cache_path.clone()))
    }
}

/// Backend keeping everything in a [`MemoryStore`]
///
/// Clones share the store, so an orchestrator built from a clone sees what
/// another one committed. The kind-cache is kept in a separate store so
/// removing the root directory never touches it.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: MemoryStore,
    kinds: MemoryStore,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl StorageBackend for MemoryBackend {
    fn content(&self, identifier: &Identifier) -> Box<dyn ContentMedium> {
        Box::new(self.store.content(identifier.as_str()))
    }

    fn directory(&self, identifier: &Identifier) -> Box<dyn DirectoryMedium> {
        Box::new(self.store.directory(identifier.as_str()))
    }

    fn location(&self, _identifier: &Identifier) -> Option<PathBuf> {
        None
    }

    fn kind_cache(&self) -> Box<dyn ContentMedium> {
        Box::new(self.kinds.content("kinds"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_backend_maps_segments_to_path() {
        let backend = FsBackend::new("/data/store");
        let id = Identifier::parse("a:b:c.json").unwrap();
        assert_eq!(
            backend.location(&id),
            Some(PathBuf::from("/data/store/a/b/c.json"))
        );
        assert_eq!(
            backend.location(&Identifier::root()),
            Some(PathBuf::from("/data/store"))
        );
    }

    #[test]
    fn test_fs_backend_cache_beside_root() {
        let backend = FsBackend::new("/data/store");
        assert_eq!(backend.cache_path(), Path::new("/data/store.kinds.json"));

        let backend = backend.with_cache_path("/tmp/kinds.json");
        assert_eq!(backend.cache_path(), Path::new("/tmp/kinds.json"));
    }

    #[test]
    fn test_memory_backend_has_no_location() {
        let backend = MemoryBackend::new();
        let id = Identifier::parse("a").unwrap();
        assert_eq!(backend.location(&id), None);
    }

    #[test]
    fn test_memory_kind_cache_is_not_a_file() {
        let backend = MemoryBackend::new();
        let mut cache = backend.kind_cache();
        cache.write(b"{}").unwrap();
        assert!(cache.exists().unwrap());
        assert_eq!(backend.store().file_count(), 0);

        let id = Identifier::parse("a").unwrap();
        assert!(!backend.content(&id).exists().unwrap());
    }
}

//! Prefixed storage views

use crate::error::{StorageError, StorageResult};
use crate::operations::StorageOperations;
use crate::storage::AccessStorage;
use accessors::AccessorHandle;
use core_types::{AccessKind, Identifier};

/// View that nests every identifier under a prefix
///
/// Borrows the storage mutably, so the parent cannot be used while a view
/// is alive. Views nest through [`StorageOperations::sub_storage`].
#[derive(Debug)]
pub struct SubStorage<'a> {
    storage: &'a mut AccessStorage,
    prefix: Identifier,
    directory: bool,
}

impl<'a> SubStorage<'a> {
    /// `prefix` must be a directory or a leaf with exactly one kind
    pub(crate) fn new(storage: &'a mut AccessStorage, prefix: Identifier) -> StorageResult<Self> {
        let kinds = storage.access_kinds(prefix.as_str())?;
        if kinds.len() != 1 {
            return Err(StorageError::InvalidOperation(format!(
                "Prefix '{}' is not a valid sub-storage root",
                prefix
            )));
        }
        let directory = kinds[0] == AccessKind::Directory;
        Ok(Self {
            storage,
            prefix,
            directory,
        })
    }

    pub fn prefix(&self) -> &Identifier {
        &self.prefix
    }

    fn full(&self, identifier: &str) -> StorageResult<String> {
        Ok(Identifier::parse(identifier)?.under(&self.prefix).to_string())
    }
}

impl StorageOperations for SubStorage<'_> {
    fn access(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle> {
        let full = self.full(identifier)?;
        self.storage.access(&full, kind)
    }

    fn create(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle> {
        let full = self.full(identifier)?;
        self.storage.create(&full, kind)
    }

    fn open(&mut self, identifier: &str, kind: AccessKind) -> StorageResult<AccessorHandle> {
        let full = self.full(identifier)?;
        self.storage.open(&full, kind)
    }

    fn copy_to(&mut self, from: &str, to: &str) -> StorageResult<()> {
        let (from, to) = (self.full(from)?, self.full(to)?);
        self.storage.copy_to(&from, &to)
    }

    fn move_to(&mut self, from: &str, to: &str) -> StorageResult<()> {
        let (from, to) = (self.full(from)?, self.full(to)?);
        self.storage.move_to(&from, &to)
    }

    fn drop(&mut self, identifier: &str) -> StorageResult<()> {
        let full = self.full(identifier)?;
        self.storage.drop(&full)
    }

    fn drop_dir(&mut self, identifier: &str) -> StorageResult<()> {
        let full = self.full(identifier)?;
        self.storage.drop_dir(&full)
    }

    fn drop_all(&mut self) -> StorageResult<()> {
        if self.directory {
            self.storage.drop_dir(self.prefix.as_str())
        } else {
            self.storage.drop(self.prefix.as_str())
        }
    }

    fn release(&mut self, identifier: &str) -> StorageResult<()> {
        let full = self.full(identifier)?;
        self.storage.release(&full)
    }

    fn release_dir(&mut self, identifier: &str) -> StorageResult<()> {
        let full = self.full(identifier)?;
        self.storage.release_dir(&full)
    }

    fn release_all(&mut self) -> StorageResult<()> {
        if self.directory {
            self.storage.release_dir(self.prefix.as_str())
        } else {
            self.storage.release(self.prefix.as_str())
        }
    }

    fn commit(&mut self, identifier: &str) -> StorageResult<()> {
        let full = self.full(identifier)?;
        self.storage.commit(&full)
    }

    fn commit_all(&mut self) -> StorageResult<()> {
        self.storage.commit(self.prefix.as_str())
    }

    fn access_kinds(&self, identifier: &str) -> StorageResult<Vec<AccessKind>> {
        let full = self.full(identifier)?;
        self.storage.access_kinds(&full)
    }

    fn sub_storage(&mut self, prefix: &str) -> StorageResult<SubStorage<'_>> {
        let prefix = Identifier::parse(prefix)?.under(&self.prefix);
        SubStorage::new(self.storage, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use access_tree::{AccessSpec, AccessTree};

    fn storage() -> AccessStorage {
        let mut storage = AccessStorage::in_memory();
        storage
            .register(
                AccessTree::new()
                    .dir(
                        "app",
                        AccessTree::new()
                            .leaf("config.json", AccessSpec::json())
                            .dir("logs", AccessTree::new().leaf("*", AccessSpec::Text)),
                    )
                    .leaf("u", AccessSpec::union([AccessSpec::Text, AccessSpec::Binary]))
                    .leaf("doc", AccessSpec::json()),
            )
            .unwrap();
        storage
    }

    #[test]
    fn test_identifiers_are_prefixed() {
        let mut storage = storage();
        {
            let mut app = storage.sub_storage("app").unwrap();
            app.access_as_json("config.json").unwrap();
            let mut logs = app.sub_storage("logs").unwrap();
            assert_eq!(logs.prefix().as_str(), "app:logs");
            logs.access_as_text("today").unwrap();
        }
        assert!(storage.is_live("app:config.json"));
        assert!(storage.is_live("app:logs:today"));
    }

    #[test]
    fn test_invalid_prefixes() {
        let mut storage = storage();
        for prefix in ["u", "missing"] {
            let err = storage.sub_storage(prefix).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Prefix '{}' is not a valid sub-storage root", prefix)
            );
        }
    }

    #[test]
    fn test_release_all_is_scoped() {
        let mut storage = storage();
        storage.access_as_json("app:config.json").unwrap();
        storage.access_as_text("u").unwrap();

        storage.sub_storage("app").unwrap().release_all().unwrap();
        assert!(!storage.is_live("app"));
        assert!(!storage.is_live("app:config.json"));
        assert!(storage.is_live("u"));
    }

    #[test]
    fn test_leaf_prefix_whole_view_operations() {
        let mut storage = storage();
        {
            let mut doc = storage.sub_storage("doc").unwrap();
            let json = doc.access_as_json("").unwrap();
            json.lock().set_one("k", serde_json::json!(1)).unwrap();
            doc.commit_all().unwrap();
            doc.release_all().unwrap();
        }
        assert!(!storage.is_live("doc"));

        {
            let mut doc = storage.sub_storage("doc").unwrap();
            let json = doc.open_as_json("").unwrap();
            assert_eq!(json.lock().get_one("k").unwrap(), Some(serde_json::json!(1)));
            doc.drop_all().unwrap();
        }
        assert!(!storage.is_live("doc"));
        assert!(matches!(
            storage.open("doc", AccessKind::Json),
            Err(StorageError::InvalidOperation(_))
        ));
    }
}

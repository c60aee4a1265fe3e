//! Directory and root accessors
//!
//! Directories carry no content of their own. A directory exists once it has
//! been materialized on its medium; the root always exists.

use crate::accessor::{Accessor, AccessorRef};
use crate::error::{AccessorError, AccessorResult};
use crate::manager::AccessorHandle;
use crate::medium::{DirectoryEntry, DirectoryMedium};
use access_tree::AccessTree;
use core_types::AccessKind;

/// Accessor for a registered directory
pub struct DirectoryAccessor {
    medium: Box<dyn DirectoryMedium>,
    tree: AccessTree,
    dropped: bool,
}

impl DirectoryAccessor {
    /// `tree` is the registered subtree the directory matched
    pub fn new(medium: Box<dyn DirectoryMedium>, tree: AccessTree) -> Self {
        Self {
            medium,
            tree,
            dropped: false,
        }
    }

    pub fn tree(&self) -> &AccessTree {
        &self.tree
    }

    /// Every committed file below this directory
    pub fn files(&self) -> AccessorResult<Vec<DirectoryEntry>> {
        if self.dropped {
            return Err(AccessorError::Dropped);
        }
        self.medium.files()
    }
}

impl Accessor for DirectoryAccessor {
    fn kind(&self) -> AccessKind {
        AccessKind::Directory
    }

    fn exists(&self) -> AccessorResult<bool> {
        self.medium.exists()
    }

    fn create(&mut self) -> AccessorResult<()> {
        self.medium.create()?;
        self.dropped = false;
        Ok(())
    }

    fn load(&mut self) -> AccessorResult<()> {
        Ok(())
    }

    fn save(&mut self) -> AccessorResult<()> {
        Ok(())
    }

    fn destroy(&mut self) -> AccessorResult<()> {
        if self.dropped {
            return Ok(());
        }
        self.medium.remove()?;
        self.dropped = true;
        Ok(())
    }

    fn is_dropped(&self) -> bool {
        self.dropped
    }

    /// Directories are compatible when they were registered with the same subtree
    fn is_compatible(&self, other: &Self) -> bool {
        self.tree == other.tree
    }

    fn copy_into(&self, target: &mut Self) -> AccessorResult<()> {
        let files = self.files()?;
        if target.dropped {
            return Err(AccessorError::Dropped);
        }
        target.medium.restore(&files)
    }

    fn into_handle(shared: AccessorRef<Self>) -> AccessorHandle {
        AccessorHandle::Directory(shared)
    }
}

/// Sentinel accessor for the storage root
///
/// Always exists and ignores every lifecycle call.
#[derive(Debug, Default)]
pub struct RootAccessor;

impl Accessor for RootAccessor {
    fn kind(&self) -> AccessKind {
        AccessKind::Directory
    }

    fn exists(&self) -> AccessorResult<bool> {
        Ok(true)
    }

    fn create(&mut self) -> AccessorResult<()> {
        Ok(())
    }

    fn load(&mut self) -> AccessorResult<()> {
        Ok(())
    }

    fn save(&mut self) -> AccessorResult<()> {
        Ok(())
    }

    fn destroy(&mut self) -> AccessorResult<()> {
        Ok(())
    }

    fn is_dropped(&self) -> bool {
        false
    }

    fn is_compatible(&self, _other: &Self) -> bool {
        false
    }

    fn copy_into(&self, _target: &mut Self) -> AccessorResult<()> {
        Err(AccessorError::Unsupported("copy".to_string()))
    }

    fn into_handle(_shared: AccessorRef<Self>) -> AccessorHandle {
        AccessorHandle::Root
    }
}

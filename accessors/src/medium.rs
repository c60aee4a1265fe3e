//! Backing media
//!
//! A medium is where an accessor's bytes live between commits. Content media
//! hold one blob; directory media hold a subtree of blobs.
//!
//! File writes go to a temporary file in the destination directory and are
//! renamed into place, so a reader never observes a partial commit.

use crate::error::AccessorResult;
use core_types::DELIMITER;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// A file found below a directory medium
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Segments relative to the directory
    pub path: Vec<String>,
    pub contents: Vec<u8>,
}

impl DirectoryEntry {
    pub fn new(path: Vec<String>, contents: Vec<u8>) -> Self {
        Self { path, contents }
    }
}

/// Storage for one blob
pub trait ContentMedium: Send {
    fn exists(&self) -> AccessorResult<bool>;

    /// Reads the blob, `None` if it does not exist
    fn read(&self) -> AccessorResult<Option<Vec<u8>>>;

    /// Replaces the blob atomically
    fn write(&mut self, bytes: &[u8]) -> AccessorResult<()>;

    /// Removes the blob; removing a missing blob succeeds
    fn remove(&mut self) -> AccessorResult<()>;

    /// Filesystem location, if the medium has one
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Storage for a subtree of blobs
pub trait DirectoryMedium: Send {
    fn exists(&self) -> AccessorResult<bool>;

    fn create(&mut self) -> AccessorResult<()>;

    /// Removes the directory and everything below it
    fn remove(&mut self) -> AccessorResult<()>;

    /// Lists every file below the directory
    fn files(&self) -> AccessorResult<Vec<DirectoryEntry>>;

    /// Writes files below the directory, creating it if needed
    fn restore(&mut self, files: &[DirectoryEntry]) -> AccessorResult<()>;
}

/// Blob stored as a file on disk
#[derive(Debug, Clone)]
pub struct FileMedium {
    path: PathBuf,
}

impl FileMedium {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentMedium for FileMedium {
    fn exists(&self) -> AccessorResult<bool> {
        Ok(self.path.is_file())
    }

    fn read(&self) -> AccessorResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> AccessorResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| err.error)?;

        tracing::trace!(path = %self.path.display(), len = bytes.len(), "wrote file");
        Ok(())
    }

    fn remove(&mut self) -> AccessorResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Directory on disk
#[derive(Debug, Clone)]
pub struct FsDirectory {
    path: PathBuf,
}

impl FsDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn collect(dir: &Path, prefix: &mut Vec<String>, out: &mut Vec<DirectoryEntry>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type()?;

            prefix.push(name);
            if file_type.is_dir() {
                Self::collect(&entry.path(), prefix, out)?;
            } else if file_type.is_file() {
                out.push(DirectoryEntry::new(prefix.clone(), fs::read(entry.path())?));
            }
            prefix.pop();
        }
        Ok(())
    }
}

impl DirectoryMedium for FsDirectory {
    fn exists(&self) -> AccessorResult<bool> {
        Ok(self.path.is_dir())
    }

    fn create(&mut self) -> AccessorResult<()> {
        fs::create_dir_all(&self.path)?;
        Ok(())
    }

    fn remove(&mut self) -> AccessorResult<()> {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn files(&self) -> AccessorResult<Vec<DirectoryEntry>> {
        let mut out = Vec::new();
        if self.path.is_dir() {
            Self::collect(&self.path, &mut Vec::new(), &mut out)?;
        }
        Ok(out)
    }

    fn restore(&mut self, files: &[DirectoryEntry]) -> AccessorResult<()> {
        fs::create_dir_all(&self.path)?;
        for file in files {
            let target = file
                .path
                .iter()
                .fold(self.path.clone(), |path, segment| path.join(segment));
            FileMedium::new(target).write(&file.contents)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

/// Shared in-memory store
///
/// Clones share contents, so media created from different clones see the
/// same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self, key: impl Into<String>) -> MemoryMedium {
        MemoryMedium {
            key: key.into(),
            store: self.clone(),
        }
    }

    pub fn directory(&self, key: impl Into<String>) -> MemoryDirectory {
        MemoryDirectory {
            key: key.into(),
            store: self.clone(),
        }
    }

    /// Number of stored blobs
    pub fn file_count(&self) -> usize {
        self.state.lock().files.len()
    }
}

fn child_prefix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{}{}", key, DELIMITER)
    }
}

/// Blob held in a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    key: String,
    store: MemoryStore,
}

impl ContentMedium for MemoryMedium {
    fn exists(&self) -> AccessorResult<bool> {
        Ok(self.store.state.lock().files.contains_key(&self.key))
    }

    fn read(&self) -> AccessorResult<Option<Vec<u8>>> {
        Ok(self.store.state.lock().files.get(&self.key).cloned())
    }

    fn write(&mut self, bytes: &[u8]) -> AccessorResult<()> {
        self.store
            .state
            .lock()
            .files
            .insert(self.key.clone(), bytes.to_vec());
        Ok(())
    }

    fn remove(&mut self) -> AccessorResult<()> {
        self.store.state.lock().files.remove(&self.key);
        Ok(())
    }
}

/// Directory held in a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    key: String,
    store: MemoryStore,
}

impl DirectoryMedium for MemoryDirectory {
    fn exists(&self) -> AccessorResult<bool> {
        Ok(self.key.is_empty() || self.store.state.lock().dirs.contains(&self.key))
    }

    fn create(&mut self) -> AccessorResult<()> {
        if !self.key.is_empty() {
            self.store.state.lock().dirs.insert(self.key.clone());
        }
        Ok(())
    }

    fn remove(&mut self) -> AccessorResult<()> {
        let prefix = child_prefix(&self.key);
        let mut state = self.store.state.lock();
        state.files.retain(|key, _| !key.starts_with(&prefix));
        state
            .dirs
            .retain(|key| key != &self.key && !key.starts_with(&prefix));
        Ok(())
    }

    fn files(&self) -> AccessorResult<Vec<DirectoryEntry>> {
        let prefix = child_prefix(&self.key);
        let state = self.store.state.lock();
        Ok(state
            .files
            .iter()
            .filter_map(|(key, contents)| {
                let relative = key.strip_prefix(&prefix)?;
                let path = relative.split(DELIMITER).map(str::to_string).collect();
                Some(DirectoryEntry::new(path, contents.clone()))
            })
            .collect())
    }

    fn restore(&mut self, files: &[DirectoryEntry]) -> AccessorResult<()> {
        self.create()?;
        let prefix = child_prefix(&self.key);
        let mut state = self.store.state.lock();
        for file in files {
            for depth in 1..file.path.len() {
                let dir = format!("{}{}", prefix, file.path[..depth].join(":"));
                state.dirs.insert(dir);
            }
            let key = format!("{}{}", prefix, file.path.join(":"));
            state.files.insert(key, file.contents.clone());
        }
        Ok(())
    }
}

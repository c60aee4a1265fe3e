//! Kind-cache persistence
//!
//! The kind-cache records which kind each identifier was last materialized
//! as, so copy and move can check compatibility without loading the source.
//! It is mirrored to a versioned JSON document on every commit-style
//! operation.

use crate::error::StorageResult;
use accessors::ContentMedium;
use core_types::{AccessKind, Identifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Serializable kind-cache document
/// Uses BTreeMap for stable ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindCacheData {
    /// Version of the document format
    pub version: u32,
    pub entries: BTreeMap<String, AccessKind>,
}

impl KindCacheData {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl Default for KindCacheData {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type for kind-cache persistence
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur while (de)serializing the kind-cache
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize kind cache: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize kind cache: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported kind cache version: {0}")]
    UnsupportedVersion(u32),
}

pub fn serialize_kinds(data: &KindCacheData) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

pub fn deserialize_kinds(bytes: &[u8]) -> PersistenceResult<KindCacheData> {
    let data: KindCacheData = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;

    if data.version != KindCacheData::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(data.version));
    }

    Ok(data)
}

/// Identifier to kind table, optionally mirrored to a medium
///
/// A disabled cache remembers nothing; callers fall back to live accessors
/// and the registered tree.
pub struct KindCache {
    medium: Option<Box<dyn ContentMedium>>,
    entries: BTreeMap<Identifier, AccessKind>,
    dirty: bool,
}

impl KindCache {
    pub fn disabled() -> Self {
        Self {
            medium: None,
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Reads the persisted table
    ///
    /// An unreadable or unsupported document is logged and treated as empty.
    pub fn load(medium: Box<dyn ContentMedium>) -> Self {
        let entries = match Self::read(medium.as_ref()) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable kind cache");
                BTreeMap::new()
            }
        };

        Self {
            medium: Some(medium),
            entries,
            dirty: false,
        }
    }

    fn read(medium: &dyn ContentMedium) -> Result<BTreeMap<Identifier, AccessKind>, String> {
        let bytes = match medium.read().map_err(|e| e.to_string())? {
            Some(bytes) => bytes,
            None => return Ok(BTreeMap::new()),
        };
        let data = deserialize_kinds(&bytes).map_err(|e| e.to_string())?;

        let mut entries = BTreeMap::new();
        for (raw, kind) in data.entries {
            match Identifier::parse(&raw) {
                Ok(identifier) => {
                    entries.insert(identifier, kind);
                }
                Err(err) => tracing::warn!(identifier = %raw, error = %err, "skipping kind cache entry"),
            }
        }
        Ok(entries)
    }

    pub fn is_enabled(&self) -> bool {
        self.medium.is_some()
    }

    pub fn get(&self, identifier: &Identifier) -> Option<&AccessKind> {
        self.entries.get(identifier)
    }

    pub fn insert(&mut self, identifier: Identifier, kind: AccessKind) {
        if !self.is_enabled() || identifier.is_root() {
            return;
        }
        if self.entries.get(&identifier) != Some(&kind) {
            self.entries.insert(identifier, kind);
            self.dirty = true;
        }
    }

    pub fn remove(&mut self, identifier: &Identifier) {
        if self.entries.remove(identifier).is_some() {
            self.dirty = true;
        }
    }

    /// Removes `identifier` and every entry below it
    pub fn remove_within(&mut self, identifier: &Identifier) {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.is_within(identifier));
        if self.entries.len() != before {
            self.dirty = true;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the table back if it changed since the last flush
    pub fn flush(&mut self) -> StorageResult<()> {
        let medium = match self.medium.as_mut() {
            Some(medium) if self.dirty => medium,
            _ => return Ok(()),
        };

        let mut data = KindCacheData::new();
        data.entries = self
            .entries
            .iter()
            .map(|(identifier, kind)| (identifier.to_string(), kind.clone()))
            .collect();

        medium.write(&serialize_kinds(&data)?)?;
        self.dirty = false;

        tracing::trace!(entries = data.entries.len(), "flushed kind cache");
        Ok(())
    }
}

impl fmt::Debug for KindCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindCache")
            .field("enabled", &self.is_enabled())
            .field("entries", &self.entries)
            .field("dirty", &self.dirty)
            .finish()
    }
}

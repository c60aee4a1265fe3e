//! Storage configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How an [`AccessStorage`](crate::AccessStorage) is backed
///
/// ```json
/// { "root": "/var/lib/app", "cache": true, "cache_path": "/var/lib/app.kinds.json" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root on disk; `None` keeps everything in memory
    pub root: Option<PathBuf>,
    /// Whether the kind-cache is persisted; defaults to on for disk storage
    pub cache: Option<bool>,
    /// Kind-cache location; defaults to `<root>.kinds.json`
    pub cache_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn on_disk(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = Some(enabled);
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Parses a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.unwrap_or(self.root.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_defaults_follow_backend() {
        assert!(StorageConfig::on_disk("/data").cache_enabled());
        assert!(!StorageConfig::in_memory().cache_enabled());
        assert!(StorageConfig::in_memory().with_cache(true).cache_enabled());
    }

    #[test]
    fn test_from_json_str() {
        let config =
            StorageConfig::from_json_str(r#"{ "root": "/data", "cache": false }"#).unwrap();
        assert_eq!(config.root(), Some(Path::new("/data")));
        assert!(!config.cache_enabled());
        assert_eq!(config.cache_path, None);

        let empty = StorageConfig::from_json_str("{}").unwrap();
        assert_eq!(empty, StorageConfig::in_memory());
    }

    #[test]
    fn test_from_json_str_rejects_bad_types() {
        assert!(StorageConfig::from_json_str(r#"{ "cache": "yes" }"#).is_err());
    }
}

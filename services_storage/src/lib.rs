//! # Storage Service
//!
//! This crate is the public entry point of the virtual storage layer.
//!
//! ## Philosophy
//!
//! Callers never touch files. They declare which identifiers exist and what
//! shape of data each one holds, then work through typed accessors:
//! - Identifiers, not paths (`config:app.json`)
//! - Declared shapes, not free-form bytes
//! - Explicit lifecycle with commit, release and drop
//!
//! ## Design
//!
//! - **AccessStorage**: Owns the live accessor cache and the kind-cache
//! - **StorageOperations**: Identifier-addressed operations shared by views
//! - **SubStorage**: A prefixed view borrowing its parent
//! - **SharedStorage**: A mutex-guarded handle for many callers
//! - **Cascades**: Commit, release and drop visit dependents before the node
//!
//! ## Example
//!
//! ```
//! use access_tree::{AccessSpec, AccessTree};
//! use services_storage::{AccessStorage, StorageOperations};
//! use serde_json::json;
//!
//! let mut storage = AccessStorage::in_memory();
//! storage
//!     .register(AccessTree::new().dir("config", AccessTree::new().leaf("*", AccessSpec::json())))
//!     .unwrap();
//!
//! let app = storage.access_as_json("config:app.json").unwrap();
//! app.lock().set_one("theme", json!("dark")).unwrap();
//! storage.commit_all().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod kind_cache;
pub mod operations;
pub mod shared;
pub mod storage;
pub mod substorage;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use events::{Listeners, StorageEvent};
pub use kind_cache::{KindCache, KindCacheData, PersistenceError};
pub use operations::StorageOperations;
pub use shared::SharedStorage;
pub use storage::AccessStorage;
pub use substorage::SubStorage;

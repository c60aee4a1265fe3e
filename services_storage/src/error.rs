//! Storage errors

use crate::kind_cache::PersistenceError;
use access_control::AccessError;
use accessors::AccessorError;
use core_types::{AccessKind, IdentifierError};
use thiserror::Error;

/// Caller-facing storage error
#[derive(Debug, Error)]
pub enum StorageError {
    /// No registered node matches, or a directory operation targets a leaf
    #[error("'{0}' is not registered")]
    NotRegistered(String),

    /// Leaf access on a directory, or directory access on a leaf
    #[error("{0}")]
    DirectoryAccess(String),

    #[error("Access to '{identifier}' as '{kind}' is not allowed")]
    AccessDenied {
        identifier: String,
        kind: AccessKind,
    },

    #[error("Accessor '{from}' is not compatible with '{to}'")]
    UncompatibleAccessor { from: String, to: String },

    /// Operational misuse
    #[error("{0}")]
    InvalidOperation(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    /// Backing medium failure
    #[error("Accessor error: {0}")]
    Accessor(#[from] AccessorError),

    #[error("Kind cache error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl StorageError {
    /// Whether this is a misuse error rather than an authorization failure
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            StorageError::InvalidOperation(_)
                | StorageError::InvalidIdentifier(_)
                | StorageError::InvalidTree(_)
        )
    }
}

impl From<AccessError> for StorageError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotRegistered(identifier) => StorageError::NotRegistered(identifier),
            AccessError::DirectoryAccess(message) => StorageError::DirectoryAccess(message),
            AccessError::AccessDenied { identifier, kind } => {
                StorageError::AccessDenied { identifier, kind }
            }
            AccessError::UncompatibleAccessor { from, to } => {
                StorageError::UncompatibleAccessor { from, to }
            }
            AccessError::InvalidIdentifier(err) => StorageError::InvalidIdentifier(err),
            AccessError::InvalidTree(reason) => StorageError::InvalidTree(reason),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

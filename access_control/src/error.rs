//! Access control errors

use core_types::{AccessKind, IdentifierError};
use thiserror::Error;

/// Errors raised while authorizing a request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// No node matches, or a directory operation targets a leaf
    #[error("'{0}' is not registered")]
    NotRegistered(String),

    /// Leaf access on a directory, or directory access on a leaf
    #[error("{0}")]
    DirectoryAccess(String),

    /// The resolved spec does not allow the requested kind
    #[error("Access to '{identifier}' as '{kind}' is not allowed")]
    AccessDenied {
        identifier: String,
        kind: AccessKind,
    },

    /// Copy or move between incompatible accessors
    #[error("Accessor '{from}' is not compatible with '{to}'")]
    UncompatibleAccessor { from: String, to: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    /// Registration rejected
    #[error("Invalid tree: {0}")]
    InvalidTree(String),
}

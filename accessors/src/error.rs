//! Accessor errors

use thiserror::Error;

/// Errors raised by accessors and their backing media
#[derive(Debug, Error)]
pub enum AccessorError {
    /// Accessor was used after it was dropped
    #[error("This accessor has been dropped")]
    Dropped,

    /// Key is not declared in the document schema
    #[error("Field '{0}' does not exist")]
    FieldNotFound(String),

    /// Value type is not allowed at the key
    #[error("Field '{0}' is not allowed to be set")]
    TypeMismatch(String),

    /// Operation is not provided by this accessor
    #[error("This accessor does not support {0} operation")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Failure reported by a custom accessor plugin
    #[error("{0}")]
    Custom(String),
}

/// Result type for accessor operations
pub type AccessorResult<T> = Result<T, AccessorError>;

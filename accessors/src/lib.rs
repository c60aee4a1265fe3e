//! # Accessors
//!
//! This crate gives every resource kind a uniform create/load/commit/drop
//! lifecycle.
//!
//! ## Philosophy
//!
//! - **One resource, one owner**: A manager owns exactly one accessor for one
//!   identifier; callers share it through [`AccessorRef`] handles
//! - **Terminal operations are idempotent**: Dropping twice is the same as
//!   dropping once, and committing a dropped resource does nothing
//! - **Media are injected**: Accessors only see [`ContentMedium`] and
//!   [`DirectoryMedium`], never a concrete filesystem
//!
//! ## Kinds
//!
//! - [`JsonAccessor`]: Schema-checked structured documents with dotted keys
//! - [`TextAccessor`]: Whole-buffer text
//! - [`BinaryAccessor`]: Byte buffers with base64 helpers
//! - [`DirectoryAccessor`]: Materialized directories
//! - [`RootAccessor`]: The storage root sentinel
//! - [`CustomAccessor`]: Plugin kinds driven by a [`CustomAccessEvent`] table

pub mod accessor;
pub mod backend;
pub mod binary;
pub mod custom;
pub mod directory;
pub mod error;
pub mod json;
pub mod manager;
pub mod medium;
pub mod text;

pub use accessor::{Accessor, AccessorRef};
pub use backend::{FsBackend, MemoryBackend, StorageBackend};
pub use binary::BinaryAccessor;
pub use custom::{CustomAccessEvent, CustomAccessor, CustomContext, CustomState};
pub use directory::{DirectoryAccessor, RootAccessor};
pub use error::{AccessorError, AccessorResult};
pub use json::JsonAccessor;
pub use manager::{AccessorHandle, AccessorManager, ManagedAccessor};
pub use medium::{
    ContentMedium, DirectoryEntry, DirectoryMedium, FileMedium, FsDirectory, MemoryDirectory,
    MemoryMedium, MemoryStore,
};
pub use text::TextAccessor;

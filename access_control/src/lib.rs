//! # Storage Access Control
//!
//! This crate authorizes identifier-addressed requests against a registered
//! [`AccessTree`](access_tree::AccessTree) and drives the orchestrator through
//! the [`AccessHooks`] seam.
//!
//! ## Philosophy
//!
//! - **Authorize before acting**: Every hook call is preceded by a successful
//!   resolution and kind check
//! - **Walk, don't scan**: Intermediate directories are materialized in order
//!   and each step records an explicit dependency edge
//! - **Policy here, state elsewhere**: This crate owns no accessors; the
//!   orchestrator owns them and reacts to hooks
//!
//! ## Operations
//!
//! - `access`: resolve, validate the kind, materialize the directory chain, then the target
//! - `copy_to` / `move_to`: access both sides, check compatibility, transfer
//! - `destroy` / `destroy_dir`: validate the node shape, then destroy
//! - `access_kinds`: introspect without authorizing

pub mod control;
pub mod error;
pub mod hooks;

pub use control::{AccessPlan, StorageAccessControl};
pub use error::AccessError;
pub use hooks::{AccessHooks, AccessMode, TransferMode};

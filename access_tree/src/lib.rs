//! # Access Tree
//!
//! This crate describes which identifiers exist and what may be done at each one.
//!
//! ## Philosophy
//!
//! - **Registration is the whole world**: An identifier that does not resolve
//!   against the registered tree does not exist
//! - **Directory-ness is structural**: A node is a directory because it is a
//!   nested tree, never because of a tag on a leaf
//! - **Priority is strict**: Exact keys beat `*`, which beats `**/*`, at every level
//!
//! ## Design
//!
//! - An [`AccessTree`] maps segment names to nested trees or [`AccessSpec`] leaves
//! - `*` matches one segment, `**/*` swallows the remaining suffix and must be a leaf
//! - [`PathResolver`] walks a tree and reports the matched steps, so callers can
//!   materialize every intermediate directory on the way to the target

pub mod path;
pub mod spec;
pub mod tree;

pub use path::{MatchedStep, PathError, PathResolver, Resolution, ResolvedNode};
pub use spec::AccessSpec;
pub use tree::{AccessNode, AccessTree};

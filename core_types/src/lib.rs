//! # Core Types
//!
//! This crate defines the vocabulary shared by every layer of the storage stack.
//!
//! ## Philosophy
//!
//! - **Identifiers are validated once**: An [`Identifier`] that exists is well formed.
//! - **Kinds are closed with one escape hatch**: Built-in kinds are enum variants,
//!   plugin kinds carry their registered id.
//! - **Schemas are data**: A [`JsonTree`] is compared and walked, never executed.
//!
//! ## Key Types
//!
//! - [`Identifier`]: Colon-delimited path addressing a node in a registered tree
//! - [`AccessKind`]: The data-shape tag requested by callers and recorded in the kind-cache
//! - [`JsonType`]: Bit set of JSON value types allowed at a schema leaf
//! - [`JsonTree`]: Nested schema for structured documents
//! - [`AccessorId`]: Unique identifier for one materialized accessor

pub mod identifier;
pub mod ids;
pub mod json_schema;
pub mod kind;
pub mod uuid_tools;

pub use identifier::{Identifier, IdentifierError, DELIMITER, GLOBSTAR, WILDCARD};
pub use ids::AccessorId;
pub use json_schema::{FieldSchema, JsonNode, JsonTree, JsonType};
pub use kind::AccessKind;
pub use uuid_tools::new_uuid;

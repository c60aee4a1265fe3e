//! Registration tree
//!
//! This module defines the nested mapping callers register to declare which
//! identifiers exist.

use crate::path::PathError;
use crate::spec::AccessSpec;
use core_types::{Identifier, GLOBSTAR, WILDCARD};
use std::collections::BTreeMap;

/// A node of the registration tree
#[derive(Debug, Clone, PartialEq)]
pub enum AccessNode {
    /// Nested directory
    Tree(AccessTree),
    /// Leaf with its permitted data shape
    Leaf(AccessSpec),
}

/// A directory level of the registration tree
///
/// Keys are segment names, or one of the wildcard keys `*` and `**/*`.
///
/// # Examples
///
/// ```
/// use access_tree::{AccessSpec, AccessTree};
///
/// let tree = AccessTree::new()
///     .dir("notes", AccessTree::new().leaf("*", AccessSpec::Text))
///     .leaf("config.json", AccessSpec::json());
/// assert!(tree.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessTree {
    entries: BTreeMap<String, AccessNode>,
}

impl AccessTree {
    /// Creates an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a nested directory
    pub fn dir(mut self, name: impl Into<String>, tree: AccessTree) -> Self {
        self.entries.insert(name.into(), AccessNode::Tree(tree));
        self
    }

    /// Adds a leaf
    pub fn leaf(mut self, name: impl Into<String>, spec: AccessSpec) -> Self {
        self.entries.insert(name.into(), AccessNode::Leaf(spec));
        self
    }

    /// Inserts a node, returning the one it replaced
    pub fn insert(&mut self, name: impl Into<String>, node: AccessNode) -> Option<AccessNode> {
        self.entries.insert(name.into(), node)
    }

    pub fn get(&self, name: &str) -> Option<&AccessNode> {
        self.entries.get(name)
    }

    pub(crate) fn get_key_value(&self, name: &str) -> Option<(&String, &AccessNode)> {
        self.entries.get_key_value(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AccessNode)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that the tree can be registered
    ///
    /// Rejects invalid segment names, a `**/*` that is not a leaf, leaves
    /// declared as directories, and unions whose alternatives are unions or
    /// directories.
    pub fn validate(&self) -> Result<(), PathError> {
        self.validate_at("")
    }

    fn validate_at(&self, location: &str) -> Result<(), PathError> {
        for (name, node) in &self.entries {
            let here = if location.is_empty() {
                name.clone()
            } else {
                format!("{}:{}", location, name)
            };

            if name != WILDCARD && name != GLOBSTAR && !Identifier::is_valid_segment(name) {
                return Err(PathError::InvalidTree(format!(
                    "'{}' is not a valid segment name",
                    here
                )));
            }

            match node {
                AccessNode::Tree(_) if name == GLOBSTAR => {
                    return Err(PathError::InvalidTree(format!(
                        "'{}' must be a leaf",
                        here
                    )));
                }
                AccessNode::Tree(subtree) => subtree.validate_at(&here)?,
                AccessNode::Leaf(spec) => validate_leaf(&here, spec)?,
            }
        }
        Ok(())
    }
}

fn validate_leaf(location: &str, spec: &AccessSpec) -> Result<(), PathError> {
    match spec {
        AccessSpec::Directory(_) => Err(PathError::InvalidTree(format!(
            "'{}' declares a directory as a leaf",
            location
        ))),
        AccessSpec::Union(alternatives) => {
            let nested = alternatives
                .iter()
                .any(|alternative| alternative.is_union() || alternative.is_directory());
            if nested {
                return Err(PathError::InvalidTree(format!(
                    "Union at '{}' may only contain leaf specs",
                    location
                )));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

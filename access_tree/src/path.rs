//! Identifier resolution
//!
//! This module matches identifiers against a registered [`AccessTree`].

use crate::spec::AccessSpec;
use crate::tree::{AccessNode, AccessTree};
use core_types::{AccessKind, Identifier, IdentifierError, GLOBSTAR, WILDCARD};
use thiserror::Error;

/// Errors that can occur during resolution
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Identifier is malformed
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    /// No node of the tree matches the identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resolution ended on a leaf where a directory was required
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Tree cannot be registered
    #[error("Invalid tree: {0}")]
    InvalidTree(String),
}

/// The node an identifier resolved to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedNode<'a> {
    Directory(&'a AccessTree),
    Leaf(&'a AccessSpec),
}

/// One matched level of the walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedStep<'a> {
    /// Tree key that matched: a segment name, `*` or `**/*`
    pub key: &'a str,
    /// The subtree entered at this step, `None` for a leaf
    pub subtree: Option<&'a AccessTree>,
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub node: ResolvedNode<'a>,
    /// Matched keys from the root down; `**/*` appears once however many
    /// segments it absorbed
    pub steps: Vec<MatchedStep<'a>>,
}

impl<'a> Resolution<'a> {
    pub fn is_directory(&self) -> bool {
        matches!(self.node, ResolvedNode::Directory(_))
    }

    /// Matched tree keys, in order
    pub fn matched_path(&self) -> Vec<&'a str> {
        self.steps.iter().map(|step| step.key).collect()
    }

    /// Intermediate directories between the root and the target
    ///
    /// Each entry pairs the accumulated identifier with the subtree it
    /// matched. The target itself is not included.
    pub fn directory_chain(&self, identifier: &Identifier) -> Vec<(Identifier, &'a AccessTree)> {
        let intermediate = self.steps.len().saturating_sub(1);
        self.steps[..intermediate]
            .iter()
            .enumerate()
            .filter_map(|(index, step)| {
                step.subtree
                    .map(|subtree| (identifier.prefix(index + 1), subtree))
            })
            .collect()
    }

    /// Kinds the target can be accessed as
    pub fn kinds(&self) -> Vec<AccessKind> {
        match self.node {
            ResolvedNode::Directory(_) => vec![AccessKind::Directory],
            ResolvedNode::Leaf(spec) => spec.kinds(),
        }
    }
}

/// Path resolver
///
/// Owns one registered tree and resolves identifiers against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathResolver {
    tree: AccessTree,
}

impl PathResolver {
    pub fn new(tree: AccessTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &AccessTree {
        &self.tree
    }

    /// Resolves an identifier
    ///
    /// At every level an exact key is tried first, then `*`, then `**/*`.
    /// A matching exact key is final: if the walk below it fails the
    /// identifier is not found. A `*` that fails below falls through to
    /// `**/*`.
    ///
    /// # Examples
    ///
    /// ```
    /// use access_tree::{AccessSpec, AccessTree, PathResolver};
    /// use core_types::Identifier;
    ///
    /// let resolver = PathResolver::new(
    ///     AccessTree::new().dir("a", AccessTree::new().leaf("*", AccessSpec::Text)),
    /// );
    /// let id = Identifier::parse("a:notes.txt").unwrap();
    /// let resolution = resolver.resolve(&id).unwrap();
    /// assert_eq!(resolution.matched_path(), vec!["a", "*"]);
    /// ```
    pub fn resolve(&self, identifier: &Identifier) -> Result<Resolution<'_>, PathError> {
        let segments: Vec<&str> = identifier.segments().collect();
        let mut steps = Vec::with_capacity(segments.len());

        let node = find(&self.tree, &segments, &mut steps)
            .ok_or_else(|| PathError::NotFound(identifier.to_string()))?;

        Ok(Resolution { node, steps })
    }

    /// Returns a resolver scoped to the directory at `identifier`
    pub fn subtree(&self, identifier: &Identifier) -> Result<PathResolver, PathError> {
        match self.resolve(identifier)?.node {
            ResolvedNode::Directory(tree) => Ok(PathResolver::new(tree.clone())),
            ResolvedNode::Leaf(_) => Err(PathError::NotADirectory(identifier.to_string())),
        }
    }

    /// Kinds available at `identifier`; empty when it does not resolve
    pub fn access_kinds(&self, identifier: &Identifier) -> Vec<AccessKind> {
        self.resolve(identifier)
            .map(|resolution| resolution.kinds())
            .unwrap_or_default()
    }
}

fn find<'a>(
    tree: &'a AccessTree,
    segments: &[&str],
    steps: &mut Vec<MatchedStep<'a>>,
) -> Option<ResolvedNode<'a>> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(ResolvedNode::Directory(tree));
    };

    if let Some((key, node)) = tree.get_key_value(head) {
        return descend(key, node, rest, steps);
    }

    if let Some((key, node)) = tree.get_key_value(WILDCARD) {
        let mark = steps.len();
        if let Some(found) = descend(key, node, rest, steps) {
            return Some(found);
        }
        steps.truncate(mark);
    }

    match tree.get_key_value(GLOBSTAR) {
        Some((key, AccessNode::Leaf(spec))) => {
            steps.push(MatchedStep { key, subtree: None });
            Some(ResolvedNode::Leaf(spec))
        }
        _ => None,
    }
}

fn descend<'a>(
    key: &'a str,
    node: &'a AccessNode,
    rest: &[&str],
    steps: &mut Vec<MatchedStep<'a>>,
) -> Option<ResolvedNode<'a>> {
    match node {
        AccessNode::Tree(subtree) => {
            steps.push(MatchedStep {
                key,
                subtree: Some(subtree),
            });
            find(subtree, rest, steps)
        }
        AccessNode::Leaf(spec) if rest.is_empty() => {
            steps.push(MatchedStep { key, subtree: None });
            Some(ResolvedNode::Leaf(spec))
        }
        AccessNode::Leaf(_) => None,
    }
}

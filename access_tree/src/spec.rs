//! Access specifications
//!
//! An [`AccessSpec`] declares the data shape permitted at a leaf of the tree.

use crate::tree::AccessTree;
use core_types::{AccessKind, JsonTree};
use serde_json::Value;

/// Permitted data shape at a leaf
#[derive(Debug, Clone, PartialEq)]
pub enum AccessSpec {
    /// Registered but not accessible as content
    Nothing,
    Text,
    Binary,
    /// Structured document with an optional schema
    Json(Option<JsonTree>),
    /// Plugin-defined kind with arguments passed to every plugin event
    Custom { id: String, args: Vec<Value> },
    /// Any one of several non-union, non-directory alternatives
    Union(Vec<AccessSpec>),
    /// Synthesized when a structural directory is the access target
    Directory(AccessTree),
}

impl AccessSpec {
    /// Schemaless structured document
    pub fn json() -> Self {
        AccessSpec::Json(None)
    }

    pub fn json_with(schema: JsonTree) -> Self {
        AccessSpec::Json(Some(schema))
    }

    pub fn custom(id: impl Into<String>, args: Vec<Value>) -> Self {
        AccessSpec::Custom {
            id: id.into(),
            args,
        }
    }

    pub fn union(alternatives: impl IntoIterator<Item = AccessSpec>) -> Self {
        AccessSpec::Union(alternatives.into_iter().collect())
    }

    /// Returns the kind tag, or `None` for a union
    pub fn kind(&self) -> Option<AccessKind> {
        match self {
            AccessSpec::Nothing => Some(AccessKind::Nothing),
            AccessSpec::Text => Some(AccessKind::Text),
            AccessSpec::Binary => Some(AccessKind::Binary),
            AccessSpec::Json(_) => Some(AccessKind::Json),
            AccessSpec::Custom { id, .. } => Some(AccessKind::Custom(id.clone())),
            AccessSpec::Directory(_) => Some(AccessKind::Directory),
            AccessSpec::Union(_) => None,
        }
    }

    /// Every kind this spec can be accessed as, in registration order
    pub fn kinds(&self) -> Vec<AccessKind> {
        match self {
            AccessSpec::Union(alternatives) => {
                alternatives.iter().filter_map(AccessSpec::kind).collect()
            }
            other => other.kind().into_iter().collect(),
        }
    }

    /// Picks the spec matching `requested`
    ///
    /// A union is scanned in registration order; a custom spec matches by
    /// its plugin id.
    pub fn resolve(&self, requested: &AccessKind) -> Option<&AccessSpec> {
        match self {
            AccessSpec::Union(alternatives) => alternatives
                .iter()
                .find(|alternative| alternative.kind().as_ref() == Some(requested)),
            other if other.kind().as_ref() == Some(requested) => Some(other),
            _ => None,
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, AccessSpec::Union(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, AccessSpec::Directory(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_spec_resolves_own_kind() {
        let spec = AccessSpec::Text;
        assert_eq!(spec.resolve(&AccessKind::Text), Some(&AccessSpec::Text));
        assert_eq!(spec.resolve(&AccessKind::Json), None);
    }

    #[test]
    fn test_union_resolves_in_order() {
        let spec = AccessSpec::union([AccessSpec::json(), AccessSpec::Text, AccessSpec::Binary]);
        assert_eq!(spec.kind(), None);
        assert_eq!(
            spec.kinds(),
            vec![AccessKind::Json, AccessKind::Text, AccessKind::Binary]
        );
        assert_eq!(spec.resolve(&AccessKind::Text), Some(&AccessSpec::Text));
        assert_eq!(spec.resolve(&AccessKind::Directory), None);
    }

    #[test]
    fn test_custom_matches_by_id() {
        let spec = AccessSpec::custom("counter", vec![json!(3)]);
        assert_eq!(spec.kind(), Some(AccessKind::Custom("counter".into())));
        assert!(spec.resolve(&AccessKind::from("counter")).is_some());
        assert!(spec.resolve(&AccessKind::from("other")).is_none());
    }
}

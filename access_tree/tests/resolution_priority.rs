//! Resolution priority properties
//!
//! These tests validate that for trees with exact, `*` and `**/*` entries at
//! the same level:
//! - An exact key always wins over `*`
//! - `*` always wins over `**/*`
//! - `**/*` takes every identifier nothing else claims

use access_tree::{AccessSpec, AccessTree, PathResolver, ResolvedNode};
use core_types::Identifier;
use proptest::prelude::*;

fn priority_tree() -> PathResolver {
    PathResolver::new(
        AccessTree::new()
            .leaf("exact", AccessSpec::Text)
            .leaf("*", AccessSpec::Binary)
            .leaf("**/*", AccessSpec::json()),
    )
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![Just("exact".to_string()), "[a-z]{1,6}"]
}

proptest! {
    /// Single-segment identifiers never reach `**/*`.
    #[test]
    fn single_segment_prefers_exact_then_wildcard(name in segment()) {
        let resolver = priority_tree();
        let identifier = Identifier::parse(&name).unwrap();
        let resolution = resolver.resolve(&identifier).unwrap();

        let expected = if name == "exact" { AccessSpec::Text } else { AccessSpec::Binary };
        prop_assert_eq!(resolution.node, ResolvedNode::Leaf(&expected));
    }

    /// Longer identifiers fall through `*` leaves to `**/*` unless the first
    /// segment matched exactly.
    #[test]
    fn multi_segment_falls_through_to_globstar(
        first in segment(),
        rest in prop::collection::vec("[a-z]{1,6}", 1..5),
    ) {
        let resolver = priority_tree();
        let raw = format!("{}:{}", first, rest.join(":"));
        let identifier = Identifier::parse(&raw).unwrap();
        let result = resolver.resolve(&identifier);

        if first == "exact" {
            prop_assert!(result.is_err());
        } else {
            let resolution = result.unwrap();
            prop_assert_eq!(resolution.node, ResolvedNode::Leaf(&AccessSpec::Json(None)));
            prop_assert_eq!(resolution.matched_path(), vec!["**/*"]);
        }
    }
}

#[test]
fn test_priority_holds_inside_directories() {
    let resolver = PathResolver::new(
        AccessTree::new().dir(
            "docs",
            AccessTree::new()
                .dir("exact", AccessTree::new().leaf("file", AccessSpec::Text))
                .dir("*", AccessTree::new().leaf("file", AccessSpec::Binary))
                .leaf("**/*", AccessSpec::json()),
        ),
    );

    let exact = Identifier::parse("docs:exact:file").unwrap();
    assert_eq!(
        resolver.resolve(&exact).unwrap().matched_path(),
        vec!["docs", "exact", "file"]
    );

    let wild = Identifier::parse("docs:other:file").unwrap();
    assert_eq!(
        resolver.resolve(&wild).unwrap().matched_path(),
        vec!["docs", "*", "file"]
    );

    let glob = Identifier::parse("docs:other:elsewhere").unwrap();
    assert_eq!(
        resolver.resolve(&glob).unwrap().matched_path(),
        vec!["docs", "**/*"]
    );
}

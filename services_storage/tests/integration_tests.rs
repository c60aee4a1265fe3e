//! Integration tests for the storage service
//!
//! These tests validate the storage behavior end to end:
//! - Authorization of accesses against the registered tree
//! - At-most-one live accessor per identifier
//! - Idempotent drop, release and commit
//! - Cascades visiting dependents before their directory
//! - Copy and move compatibility
//! - Sub-storage views and listeners

use access_tree::{AccessSpec, AccessTree};
use core_types::{AccessKind, AccessorId, Identifier, JsonTree, JsonType};
use parking_lot::Mutex;
use serde_json::json;
use services_storage::{AccessStorage, StorageError, StorageEvent, StorageOperations};
use std::sync::Arc;

fn id(raw: &str) -> Identifier {
    Identifier::parse(raw).unwrap()
}

fn recorded_events(storage: &mut AccessStorage) -> Arc<Mutex<Vec<StorageEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    storage.add_listener(move |event| sink.lock().push(event.clone()));
    events
}

#[test]
fn test_access_scenario() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .dir("a", AccessTree::new().leaf("*", AccessSpec::Text))
                .leaf("b", AccessSpec::json()),
        )
        .unwrap();

    storage.access("a:x", AccessKind::Text).unwrap();
    assert!(storage.is_live("a"));
    assert!(storage.is_live("a:x"));

    assert!(matches!(
        storage.access("a", AccessKind::Text),
        Err(StorageError::DirectoryAccess(_))
    ));
    assert!(matches!(
        storage.access("c", AccessKind::Text),
        Err(StorageError::NotRegistered(_))
    ));
    assert!(matches!(
        storage.access("b", AccessKind::Text),
        Err(StorageError::AccessDenied { .. })
    ));
}

#[test]
fn test_create_twice_scenario() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("f.json", AccessSpec::json()))
        .unwrap();

    storage.create("f.json", AccessKind::Json).unwrap();
    let err = storage.create("f.json", AccessKind::Json).unwrap_err();
    assert_eq!(err.to_string(), "File 'f.json' already exists in memory");
    assert!(err.is_misuse());

    storage.drop("f.json").unwrap();
    storage.create("f.json", AccessKind::Json).unwrap();
}

#[test]
fn test_create_over_committed_resource() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("f.json", AccessSpec::json()))
        .unwrap();

    storage.create_as_json("f.json").unwrap();
    storage.release("f.json").unwrap();

    let err = storage.create("f.json", AccessKind::Json).unwrap_err();
    assert_eq!(err.to_string(), "File 'f.json' already exists");
}

#[test]
fn test_open_requires_existing_resource() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("notes.txt", AccessSpec::Text))
        .unwrap();

    let err = storage.open("notes.txt", AccessKind::Text).unwrap_err();
    assert_eq!(err.to_string(), "File 'notes.txt' does not exist");

    let text = storage.create_as_text("notes.txt").unwrap();
    text.lock().write("hello").unwrap();
    storage.release("notes.txt").unwrap();

    let reopened = storage.open_as_text("notes.txt").unwrap();
    assert_eq!(reopened.lock().read().unwrap(), "hello");
}

#[test]
fn test_at_most_one_live_accessor() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("doc", AccessSpec::json()))
        .unwrap();

    let first = storage.access_as_json("doc").unwrap();
    let second = storage.access_as_json("doc").unwrap();
    assert!(first.ptr_eq(&second));

    first.lock().set_one("shared", json!(true)).unwrap();
    assert_eq!(second.lock().get_one("shared").unwrap(), Some(json!(true)));
}

#[test]
fn test_drop_is_idempotent() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("doc", AccessSpec::json()))
        .unwrap();

    let doc = storage.access_as_json("doc").unwrap();
    doc.lock().set_one("k", json!(1)).unwrap();
    storage.commit("doc").unwrap();

    for _ in 0..3 {
        storage.drop("doc").unwrap();
    }
    assert!(!storage.is_live("doc"));
    assert!(matches!(doc.lock().get_all(), Err(accessors::AccessorError::Dropped)));

    storage.commit("doc").unwrap();
    storage.release("doc").unwrap();
    storage.commit_all().unwrap();
    assert!(!storage.is_live("doc"));
    assert!(matches!(
        storage.open("doc", AccessKind::Json),
        Err(StorageError::InvalidOperation(_))
    ));
}

#[test]
fn test_release_of_never_accessed_identifier() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("doc", AccessSpec::json()))
        .unwrap();

    storage.release("doc").unwrap();
    storage.release("doc").unwrap();
    assert!(matches!(
        storage.release("missing"),
        Err(StorageError::NotRegistered(_))
    ));
}

#[test]
fn test_release_root_is_rejected() {
    let mut storage = AccessStorage::in_memory();
    let err = storage.release("").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot release the root directory. use release_all() instead."
    );
    storage.release_all().unwrap();
}

#[test]
fn test_drop_cascade_visits_children_first() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().dir(
            "a",
            AccessTree::new()
                .leaf("x", AccessSpec::Text)
                .dir("b", AccessTree::new().leaf("*", AccessSpec::Binary)),
        ))
        .unwrap();

    storage.access_as_text("a:x").unwrap();
    storage.access_as_binary("a:b:1").unwrap();
    storage.access_as_binary("a:b:2").unwrap();
    let events = recorded_events(&mut storage);

    storage.drop_dir("a").unwrap();

    let destroyed: Vec<Identifier> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            StorageEvent::Destroy { identifier } => Some(identifier.clone()),
            _ => None,
        })
        .collect();

    assert_eq!(destroyed.len(), 5);
    let position = |raw: &str| destroyed.iter().position(|i| i == &id(raw)).unwrap();
    assert!(position("a:b:1") < position("a:b"));
    assert!(position("a:b:2") < position("a:b"));
    assert!(position("a:b") < position("a"));
    assert!(position("a:x") < position("a"));
    assert_eq!(destroyed.last(), Some(&id("a")));
    assert!(storage.live_identifiers().is_empty());
}

#[test]
fn test_drop_dir_refuses_leaf() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("doc", AccessSpec::json()))
        .unwrap();

    assert!(matches!(
        storage.drop_dir("doc"),
        Err(StorageError::NotRegistered(_))
    ));
    assert!(matches!(
        storage.drop(""),
        Err(StorageError::DirectoryAccess(_))
    ));
}

#[test]
fn test_release_dir_commits_then_unloads() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().dir("notes", AccessTree::new().leaf("*", AccessSpec::Text)))
        .unwrap();

    let today = storage.access_as_text("notes:today").unwrap();
    today.lock().write("draft").unwrap();

    storage.release_dir("notes").unwrap();
    assert!(storage.live_identifiers().is_empty());

    let reloaded = storage.access_as_text("notes:today").unwrap();
    assert!(!reloaded.ptr_eq(&today));
    assert_eq!(reloaded.lock().read().unwrap(), "draft");
}

#[test]
fn test_prefix_sibling_is_not_a_dependent() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .dir("a", AccessTree::new().leaf("x", AccessSpec::Text))
                .leaf("ab", AccessSpec::Text),
        )
        .unwrap();

    storage.access_as_text("a:x").unwrap();
    storage.access_as_text("ab").unwrap();

    storage.drop_dir("a").unwrap();
    assert!(storage.is_live("ab"));
}

#[test]
fn test_copy_between_matching_schemas() {
    let schema = JsonTree::new()
        .field("name", JsonType::STRING)
        .field("count", JsonType::NUMBER);
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .leaf("src", AccessSpec::json_with(schema.clone()))
                .leaf("dst", AccessSpec::json_with(schema)),
        )
        .unwrap();

    let src = storage.access_as_json("src").unwrap();
    src.lock().set_one("name", json!("widget")).unwrap();
    src.lock().set_one("count", json!(3)).unwrap();

    storage.copy_to("src", "dst").unwrap();
    let dst = storage.access_as_json("dst").unwrap();
    assert_eq!(dst.lock().get_all().unwrap(), src.lock().get_all().unwrap());
    assert!(storage.is_live("src"));
}

#[test]
fn test_move_commits_target_and_drops_source() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .leaf("old", AccessSpec::json())
                .leaf("new", AccessSpec::json()),
        )
        .unwrap();

    let old = storage.access_as_json("old").unwrap();
    old.lock().set_one("k", json!("v")).unwrap();

    storage.move_to("old", "new").unwrap();
    assert!(!storage.is_live("old"));
    assert!(matches!(
        storage.open("old", AccessKind::Json),
        Err(StorageError::InvalidOperation(_))
    ));

    storage.release("new").unwrap();
    let new = storage.open_as_json("new").unwrap();
    assert_eq!(new.lock().get_one("k").unwrap(), Some(json!("v")));
}

#[test]
fn test_copy_between_kinds_is_incompatible() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .leaf("doc", AccessSpec::json())
                .leaf("notes", AccessSpec::Text),
        )
        .unwrap();

    let doc = storage.access_as_json("doc").unwrap();
    doc.lock().set_one("k", json!(1)).unwrap();

    assert!(matches!(
        storage.copy_to("doc", "notes"),
        Err(StorageError::UncompatibleAccessor { .. })
    ));
    assert!(matches!(
        storage.move_to("doc", "notes"),
        Err(StorageError::UncompatibleAccessor { .. })
    ));
    assert!(storage.is_live("doc"));
    assert_eq!(doc.lock().get_one("k").unwrap(), Some(json!(1)));
}

#[test]
fn test_copy_between_schemas_is_incompatible() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .leaf("a", AccessSpec::json_with(JsonTree::new().field("x", JsonType::STRING)))
                .leaf("b", AccessSpec::json_with(JsonTree::new().field("x", JsonType::NUMBER))),
        )
        .unwrap();

    let a = storage.access_as_json("a").unwrap();
    a.lock().set_one("x", json!("text")).unwrap();

    assert!(matches!(
        storage.move_to("a", "b"),
        Err(StorageError::UncompatibleAccessor { .. })
    ));
    assert!(storage.is_live("a"));
    assert_eq!(a.lock().get_one("x").unwrap(), Some(json!("text")));
}

#[test]
fn test_copy_onto_itself_is_rejected() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("doc", AccessSpec::json()))
        .unwrap();

    assert!(matches!(
        storage.copy_to("doc", "doc"),
        Err(StorageError::InvalidOperation(_))
    ));
}

#[test]
fn test_directory_copy_and_move() {
    let files = AccessTree::new().leaf("*", AccessSpec::Text);
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .dir("draft", files.clone())
                .dir("final", files.clone())
                .dir("archive", files),
        )
        .unwrap();

    let intro = storage.access_as_text("draft:intro").unwrap();
    intro.lock().write("Once upon a time").unwrap();

    storage.copy_to("draft", "final").unwrap();
    let copied = storage.open_as_text("final:intro").unwrap();
    assert_eq!(copied.lock().read().unwrap(), "Once upon a time");
    assert!(storage.is_live("draft:intro"));

    storage.move_to("final", "archive").unwrap();
    assert!(!storage.is_live("final"));
    assert!(!storage.is_live("final:intro"));
    let archived = storage.open_as_text("archive:intro").unwrap();
    assert_eq!(archived.lock().read().unwrap(), "Once upon a time");
    assert!(matches!(
        storage.open("final:intro", AccessKind::Text),
        Err(StorageError::InvalidOperation(_))
    ));
}

#[test]
fn test_access_kinds() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(
            AccessTree::new()
                .dir("a", AccessTree::new().leaf("*", AccessSpec::Text))
                .leaf("u", AccessSpec::union([AccessSpec::Binary, AccessSpec::custom("image", vec![])])),
        )
        .unwrap();

    assert_eq!(storage.access_kinds("a").unwrap(), vec![AccessKind::Directory]);
    assert_eq!(storage.access_kinds("a:x").unwrap(), vec![AccessKind::Text]);
    assert_eq!(
        storage.access_kinds("u").unwrap(),
        vec![AccessKind::Binary, AccessKind::Custom("image".into())]
    );
    assert!(storage.access_kinds("missing").unwrap().is_empty());
    assert!(matches!(
        storage.access_kinds("a::x"),
        Err(StorageError::InvalidIdentifier(_))
    ));
}

#[test]
fn test_register_rejects_nested_union() {
    let mut storage = AccessStorage::in_memory();
    let err = storage
        .register(AccessTree::new().leaf(
            "u",
            AccessSpec::union([AccessSpec::Text, AccessSpec::union([AccessSpec::Binary])]),
        ))
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidTree(_)));
    assert!(err.is_misuse());
}

#[test]
fn test_listeners_see_every_access() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().dir("a", AccessTree::new().leaf("*", AccessSpec::Text)))
        .unwrap();
    let events = recorded_events(&mut storage);

    storage.access_as_text("a:x").unwrap();
    storage.access_as_text("a:x").unwrap();
    storage.release("a:x").unwrap();

    let accessed: Vec<(Identifier, AccessKind)> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            StorageEvent::Access { identifier, kind, .. } => {
                Some((identifier.clone(), kind.clone()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        accessed,
        vec![
            (id("a"), AccessKind::Directory),
            (id("a:x"), AccessKind::Text),
            (id("a"), AccessKind::Directory),
            (id("a:x"), AccessKind::Text),
        ]
    );
}

#[test]
fn test_accessor_id_distinguishes_reload_from_cache_hit() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().leaf("doc", AccessSpec::json()))
        .unwrap();
    let events = recorded_events(&mut storage);

    storage.access_as_json("doc").unwrap();
    storage.access_as_json("doc").unwrap();
    storage.release("doc").unwrap();
    storage.access_as_json("doc").unwrap();

    let accessors: Vec<AccessorId> = events
        .lock()
        .iter()
        .filter_map(|event| match event {
            StorageEvent::Access { accessor, .. } => Some(*accessor),
            _ => None,
        })
        .collect();
    assert_eq!(accessors.len(), 3);
    assert_eq!(accessors[0], accessors[1]);
    assert_ne!(accessors[1], accessors[2]);
}

#[test]
fn test_sub_storage_operations() {
    let mut storage = AccessStorage::in_memory();
    storage
        .register(AccessTree::new().dir(
            "users",
            AccessTree::new().dir("*", AccessTree::new().leaf("profile.json", AccessSpec::json())),
        ))
        .unwrap();

    {
        let mut alice = storage.sub_storage("users:alice").unwrap();
        let profile = alice.create_as_json("profile.json").unwrap();
        profile.lock().set_one("name", json!("Alice")).unwrap();
        alice.commit_all().unwrap();
        alice.release_all().unwrap();
    }
    assert!(!storage.is_live("users:alice:profile.json"));

    let profile = storage.open_as_json("users:alice:profile.json").unwrap();
    assert_eq!(profile.lock().get_one("name").unwrap(), Some(json!("Alice")));

    storage.sub_storage("users:alice").unwrap().drop_all().unwrap();
    assert!(!storage.is_live("users:alice"));
    assert!(matches!(
        storage.open("users:alice:profile.json", AccessKind::Json),
        Err(StorageError::InvalidOperation(_))
    ));
}

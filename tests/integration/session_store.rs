//! End-to-end: sessions over the in-memory store

use remote_naming::config::NamingConfig;
use remote_naming::{Context, MemoryNamingStore, NamingError, NamingObject, NamingSession, StoreError};
use serde_json::json;

fn name(s: &str) -> remote_naming::Name {
    remote_naming::Name::parse(s).unwrap()
}

#[test]
fn test_build_and_browse_namespace() {
    let store = MemoryNamingStore::new();
    let session = NamingSession::open(store.clone(), &NamingConfig::default()).unwrap();
    let root = session.context();

    let services = root.create_subcontext_str("services").unwrap();
    assert_eq!(services.name_in_namespace(), "services");

    // bind composes onto the created context's prefix
    services
        .bind_str("billing", NamingObject::Value(json!({"host": "billing", "port": 8080})))
        .unwrap();
    services
        .bind_str("alias", NamingObject::Link(name("services/billing")))
        .unwrap();

    let listing = root.list_str("services").unwrap();
    let names: Vec<_> = listing.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["alias", "billing"]);

    assert_eq!(
        root.lookup_str("services/alias").unwrap(),
        NamingObject::Value(json!({"host": "billing", "port": 8080}))
    );
    assert_eq!(
        root.lookup_link_str("services/alias").unwrap(),
        NamingObject::Link(name("services/billing"))
    );

    session.shutdown();
    drop(services);
    drop(root);
    assert!(store.is_closed());
}

#[test]
fn test_lookup_of_subcontext_yields_positioned_context() {
    let store = MemoryNamingStore::new();
    let session = NamingSession::open(store, &NamingConfig::default()).unwrap();
    let root = session.context();
    root.create_subcontext_str("a").unwrap();
    root.create_subcontext_str("a/b").unwrap();

    let b = root.lookup_str("a/b").unwrap().into_context().unwrap();
    assert_eq!(b.name_in_namespace(), "a/b");

    b.bind_str("leaf", NamingObject::Value(json!(42))).unwrap();
    assert_eq!(
        root.lookup_str("a/b/leaf").unwrap(),
        NamingObject::Value(json!(42))
    );
}

#[test]
fn test_pass_through_names_resolve_from_store_root() {
    let store = MemoryNamingStore::new();
    let session = NamingSession::open(store, &NamingConfig::default()).unwrap();
    let root = session.context();
    root.create_subcontext_str("x").unwrap();
    root.bind_str("x/a", NamingObject::Value(json!(1))).unwrap();

    let x = root.lookup_str("x").unwrap().into_context().unwrap();

    // unbind is not prefix-relative: "a" means the root-level name "a"
    x.unbind_str("a").unwrap();
    assert_eq!(root.lookup_str("x/a").unwrap(), NamingObject::Value(json!(1)));

    x.unbind_str("x/a").unwrap();
    let err = root.lookup_str("x/a").unwrap_err();
    assert_eq!(err.store_error(), Some(&StoreError::NameNotFound(name("x/a"))));
}

#[test]
fn test_rename_and_rebind_through_context() {
    let store = MemoryNamingStore::new();
    let session = NamingSession::open(store, &NamingConfig::default()).unwrap();
    let root = session.context();

    root.bind_str("old", NamingObject::Value(json!("v1"))).unwrap();
    root.rename_str("old", "new").unwrap();
    root.rebind_str("new", NamingObject::Value(json!("v2"))).unwrap();

    assert_eq!(root.lookup_str("new").unwrap(), NamingObject::Value(json!("v2")));
    let err = root.lookup_str("old").unwrap_err();
    assert!(matches!(err, NamingError::Store(StoreError::NameNotFound(_))));

    let bindings = root.list_bindings_str("").unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].name, "new");
    assert_eq!(bindings[0].class_name, "string");
}

#[test]
fn test_destroy_subcontext_through_context() {
    let store = MemoryNamingStore::new();
    let session = NamingSession::open(store, &NamingConfig::default()).unwrap();
    let root = session.context();

    root.create_subcontext_str("tmp").unwrap();
    root.bind_str("tmp/k", NamingObject::Value(json!(1))).unwrap();
    let err = root.destroy_subcontext_str("tmp").unwrap_err();
    assert!(matches!(err, NamingError::Store(StoreError::ContextNotEmpty(_))));

    root.unbind_str("tmp/k").unwrap();
    root.destroy_subcontext_str("tmp").unwrap();
    assert!(root.list_str("").unwrap().is_empty());
}

#[test]
fn test_operations_fail_after_store_shutdown() {
    let store = MemoryNamingStore::new();
    let session = NamingSession::open(store, &NamingConfig::default()).unwrap();
    let root = session.context();
    session.shutdown();

    // Closing only discharges local cleanup; the store decides what happens next
    let err = root.lookup_str("anything").unwrap_err();
    assert!(matches!(err, NamingError::Store(StoreError::Communication(_))));
}

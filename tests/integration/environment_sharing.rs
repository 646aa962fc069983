//! Environment changes are visible across every related context

use super::test_utils::{context_at, RecordingStore};
use remote_naming::context::{Environment, RemoteContext};
use remote_naming::{Context, Name};
use serde_json::json;
use std::sync::Arc;
use std::thread;

#[test]
fn test_siblings_share_one_environment() {
    let store = RecordingStore::new();
    let root = RemoteContext::new(store, Environment::new());

    let first = root.lookup(&Name::empty()).unwrap().into_context().unwrap();
    let second = root.lookup(&Name::empty()).unwrap().into_context().unwrap();

    assert_eq!(first.add_to_environment("provider", json!("remote://a")), None);
    assert_eq!(second.environment().get("provider"), Some(json!("remote://a")));
    assert_eq!(root.environment().get("provider"), Some(json!("remote://a")));

    assert_eq!(
        second.remove_from_environment("provider"),
        Some(json!("remote://a"))
    );
    assert!(first.environment().get("provider").is_none());
    assert!(first.environment().shares_with(&second.environment()));
}

#[test]
fn test_unrelated_contexts_do_not_share() {
    let store = RecordingStore::new();
    let a = context_at(store.clone(), "");
    let b = context_at(store, "");

    a.add_to_environment("k", json!(1));
    assert!(b.environment().get("k").is_none());
    assert!(!a.environment().shares_with(&b.environment()));
}

#[test]
fn test_environment_survives_closing_one_context() {
    let store = RecordingStore::new();
    let env = Environment::new();
    let first = RemoteContext::new(store.clone(), env.clone());
    let second = RemoteContext::new(store, env.clone());

    first.add_to_environment("k", json!("v"));
    first.close();
    drop(first);

    assert_eq!(second.environment().get("k"), Some(json!("v")));
    assert_eq!(env.len(), 1);
}

#[test]
fn test_concurrent_mutation_from_siblings() {
    let store = RecordingStore::new();
    let root = Arc::new(RemoteContext::new(store, Environment::new()));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let ctx = root.lookup(&Name::empty()).unwrap().into_context().unwrap();
            thread::spawn(move || {
                for i in 0..25 {
                    ctx.add_to_environment(&format!("w{}-{}", worker, i), json!(i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(root.environment().len(), 8 * 25);
}

//! Composition properties across contexts

use proptest::prelude::*;
use remote_naming::context::{Environment, RemoteContext};
use remote_naming::{Context, MemoryNamingStore, Name};

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9/\\\\\"' ]{0,6}"
}

fn any_name() -> impl Strategy<Value = Name> {
    prop::collection::vec(segment(), 0..5).prop_map(Name::from_segments)
}

proptest! {
    /// compose(R, P) is P's segments followed by R's, in order
    #[test]
    fn compose_appends_relative_after_prefix(prefix in any_name(), relative in any_name()) {
        let store = MemoryNamingStore::new();
        let ctx = RemoteContext::builder(store).prefix(prefix.clone()).build();

        let composed = ctx.compose_name(&relative, &prefix);

        let mut expected: Vec<String> = prefix.segments().to_vec();
        expected.extend(relative.segments().iter().cloned());
        prop_assert_eq!(composed.segments(), expected.as_slice());
        prop_assert!(composed.starts_with(&prefix));
        prop_assert!(composed.ends_with(&relative));
    }

    /// Deriving in two steps equals deriving once with the joined name
    #[test]
    fn compose_is_associative(a in any_name(), b in any_name(), c in any_name()) {
        let left = Name::compose(&Name::compose(&a, &b), &c);
        let right = Name::compose(&a, &Name::compose(&b, &c));
        prop_assert_eq!(left, right);
    }

    /// An empty lookup hands back a context at exactly the same position
    #[test]
    fn empty_lookup_keeps_prefix(prefix in any_name()) {
        let store = MemoryNamingStore::new();
        let ctx = RemoteContext::new(store.clone(), Environment::new());
        let positioned = RemoteContext::builder(store)
            .prefix(prefix.clone())
            .environment(ctx.environment())
            .build();

        let sibling = positioned
            .lookup(&Name::empty())
            .unwrap()
            .into_context()
            .unwrap();
        prop_assert_eq!(sibling.name_in_namespace(), prefix.to_string());
        prop_assert!(sibling.environment().shares_with(&ctx.environment()));
    }
}

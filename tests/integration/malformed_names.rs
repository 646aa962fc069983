//! Malformed string names fail before anything reaches the store

use super::test_utils::{context_at, ForbiddenStore};
use remote_naming::{Context, NamingError, NamingObject};
use serde_json::json;
use std::sync::Arc;

const MALFORMED: &[&str] = &[
    "\"unterminated",
    "'open/close",
    "\"quoted\"tail/x",
    "a\\",
    "x/y\\",
];

fn assert_malformed<T: std::fmt::Debug>(result: Result<T, NamingError>) {
    match result {
        Err(NamingError::MalformedName { .. }) => {}
        other => panic!("expected MalformedName, got {:?}", other),
    }
}

#[test]
fn test_every_string_operation_rejects_malformed_names() {
    let ctx = context_at(Arc::new(ForbiddenStore), "x");

    for bad in MALFORMED {
        assert_malformed(ctx.lookup_str(bad));
        assert_malformed(ctx.bind_str(bad, NamingObject::Value(json!(1))));
        assert_malformed(ctx.rebind_str(bad, NamingObject::Value(json!(1))));
        assert_malformed(ctx.unbind_str(bad));
        assert_malformed(ctx.rename_str(bad, "fine"));
        assert_malformed(ctx.rename_str("fine", bad));
        assert_malformed(ctx.list_str(bad));
        assert_malformed(ctx.list_bindings_str(bad));
        assert_malformed(ctx.create_subcontext_str(bad).map(|_| ()));
        assert_malformed(ctx.destroy_subcontext_str(bad));
        assert_malformed(ctx.lookup_link_str(bad));
        assert_malformed(ctx.compose_name_str(bad, "p"));
        assert_malformed(ctx.compose_name_str("n", bad));
    }
}

#[test]
fn test_parse_reports_offending_input() {
    let ctx = context_at(Arc::new(ForbiddenStore), "");
    let err = ctx.parse("\"unterminated").unwrap_err();
    assert!(err.to_string().contains("unterminated"));
}

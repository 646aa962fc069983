//! Values a name can resolve to, and listing entries.

use crate::context::Context;
use crate::name::Name;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What a name resolves to.
///
/// Bound objects cross the remote boundary as JSON-compatible values. A store
/// may also hand back a link reference or a live context handle.
#[derive(Clone)]
pub enum NamingObject {
    Value(Value),
    Link(Name),
    Context(Arc<dyn Context>),
}

impl NamingObject {
    /// Stable type label used in listings
    pub fn class_name(&self) -> &'static str {
        match self {
            NamingObject::Value(Value::Null) => "null",
            NamingObject::Value(Value::Bool(_)) => "bool",
            NamingObject::Value(Value::Number(_)) => "number",
            NamingObject::Value(Value::String(_)) => "string",
            NamingObject::Value(Value::Array(_)) => "array",
            NamingObject::Value(Value::Object(_)) => "object",
            NamingObject::Link(_) => "link",
            NamingObject::Context(_) => "context",
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            NamingObject::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Name> {
        match self {
            NamingObject::Link(target) => Some(target),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&Arc<dyn Context>> {
        match self {
            NamingObject::Context(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn into_context(self) -> Option<Arc<dyn Context>> {
        match self {
            NamingObject::Context(ctx) => Some(ctx),
            _ => None,
        }
    }
}

impl From<Value> for NamingObject {
    fn from(value: Value) -> Self {
        NamingObject::Value(value)
    }
}

impl fmt::Debug for NamingObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingObject::Value(value) => f.debug_tuple("Value").field(value).finish(),
            NamingObject::Link(target) => f.debug_tuple("Link").field(target).finish(),
            NamingObject::Context(ctx) => f
                .debug_tuple("Context")
                .field(&ctx.name_in_namespace())
                .finish(),
        }
    }
}

/// Objects compare by value; contexts compare by handle identity.
impl PartialEq for NamingObject {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NamingObject::Value(a), NamingObject::Value(b)) => a == b,
            (NamingObject::Link(a), NamingObject::Link(b)) => a == b,
            (NamingObject::Context(a), NamingObject::Context(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A listing entry: bound name and the class label of its object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameClassPair {
    pub name: String,
    pub class_name: String,
}

/// A listing entry carrying the bound object itself
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub class_name: String,
    pub object: NamingObject,
}

impl Binding {
    pub fn new(name: impl Into<String>, object: NamingObject) -> Self {
        Self {
            name: name.into(),
            class_name: object.class_name().to_string(),
            object,
        }
    }
}

impl From<&Binding> for NameClassPair {
    fn from(binding: &Binding) -> Self {
        NameClassPair {
            name: binding.name.clone(),
            class_name: binding.class_name.clone(),
        }
    }
}

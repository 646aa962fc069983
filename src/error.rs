//! Error types for the remote naming client.

use crate::name::Name;
use thiserror::Error;

/// Errors reported by a naming store.
///
/// The facade never inspects or translates these; they reach the caller exactly
/// as the store produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Name not found: {0}")]
    NameNotFound(Name),

    #[error("Name already bound: {0}")]
    NameAlreadyBound(Name),

    #[error("Not a context: {0}")]
    NotContext(Name),

    #[error("Context not empty: {0}")]
    ContextNotEmpty(Name),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Link loop while resolving: {0}")]
    LinkLoop(Name),

    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),

    #[error("Communication failure: {0}")]
    Communication(String),
}

/// Errors surfaced by naming contexts.
#[derive(Debug, Error)]
pub enum NamingError {
    #[error("Malformed name '{name}': {reason}")]
    MalformedName { name: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl NamingError {
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        NamingError::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The store error carried by this error, if any
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            NamingError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for NamingError {
    fn from(err: config::ConfigError) -> Self {
        NamingError::ConfigError(err.to_string())
    }
}

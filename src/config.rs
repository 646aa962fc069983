//! Configuration System
//!
//! Layered client configuration: built-in defaults, the user-level config
//! file, an optional explicit file, then `NAMING__*` environment overrides.

use crate::error::NamingError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

mod defaults;
mod loader;
mod sources;

pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Initial entries of the root context's environment
    #[serde(default)]
    pub environment: HashMap<String, Value>,

    /// Close lifecycle settings
    #[serde(default)]
    pub close: CloseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Close lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseConfig {
    /// Log a warning when a session context is dropped without being closed
    #[serde(default = "default_true")]
    pub warn_on_leak: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CloseConfig {
    fn default() -> Self {
        Self {
            warn_on_leak: default_true(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Environment(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Environment(msg) => write!(f, "Environment: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl NamingConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for key in self.environment.keys() {
            if key.trim().is_empty() {
                errors.push(ValidationError::Environment(
                    "environment keys cannot be empty".to_string(),
                ));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one error
    pub fn ensure_valid(&self) -> Result<(), NamingError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            NamingError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}

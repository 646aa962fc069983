//! Configuration sources: user-level file, explicit file, environment.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use directories::ProjectDirs;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment overrides, e.g. `NAMING__CLOSE__WARN_ON_LEAK=false`
pub const ENV_PREFIX: &str = "NAMING";
pub const ENV_SEPARATOR: &str = "__";

/// `$XDG_CONFIG_HOME/remote-naming/config.toml` (or the platform equivalent)
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "remote-naming").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// The user-level config file, if one exists
pub fn existing_global_file() -> Option<PathBuf> {
    global_config_path().filter(|path| path.exists())
}

/// Add the user-level config file to the builder if it exists.
pub fn add_global_file(
    builder: ConfigBuilder<DefaultState>,
) -> ConfigBuilder<DefaultState> {
    match existing_global_file() {
        Some(path) => {
            debug!(config_path = %path.display(), "Loading user configuration");
            builder.add_source(File::from(path).required(false))
        }
        None => builder,
    }
}

/// Add an explicit config file; it must exist.
pub fn add_explicit_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Message(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    debug!(config_path = %path.display(), "Loading configuration file");
    Ok(builder.add_source(File::from(path).required(true)))
}

/// Add `NAMING__*` environment overrides, the highest layer.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    )
}

#[derive(Deserialize)]
struct EnvironmentSection {
    #[serde(default)]
    environment: HashMap<String, Value>,
}

/// Read the `[environment]` table of a config file with its keys verbatim.
///
/// The layered builder folds keys to lower case; environment keys are
/// case-sensitive and belong to the store, so they are read here instead.
pub fn read_environment_table(path: &Path) -> Result<HashMap<String, Value>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Message(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let section: EnvironmentSection = toml::from_str(&content).map_err(|e| {
        ConfigError::Message(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    Ok(section.environment)
}

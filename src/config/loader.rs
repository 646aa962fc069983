//! Configuration loading entry points.

use super::defaults::builder_with_defaults;
use super::sources;
use super::NamingConfig;
use crate::error::NamingError;
use std::path::{Path, PathBuf};

/// Loads [`NamingConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the user-level file, then environment overrides
    pub fn load() -> Result<NamingConfig, NamingError> {
        let files: Vec<PathBuf> = sources::existing_global_file().into_iter().collect();
        let builder = builder_with_defaults()?;
        let builder = sources::add_global_file(builder);
        let builder = sources::add_environment(builder);
        Self::finish(builder, &files)
    }

    /// Defaults, then `path`, then environment overrides.
    ///
    /// The user-level file is skipped so the result depends only on `path`.
    pub fn load_from_file(path: &Path) -> Result<NamingConfig, NamingError> {
        let builder = builder_with_defaults()?;
        let builder = sources::add_explicit_file(builder, path)?;
        let builder = sources::add_environment(builder);
        Self::finish(builder, &[path.to_path_buf()])
    }

    /// Built-in defaults only
    pub fn default() -> NamingConfig {
        NamingConfig::default()
    }

    pub fn xdg_config_path() -> Option<PathBuf> {
        sources::global_config_path()
    }

    /// Write `config` as TOML, creating parent directories as needed
    pub fn write(config: &NamingConfig, path: &Path) -> Result<(), NamingError> {
        let rendered = toml::to_string_pretty(config)
            .map_err(|e| NamingError::ConfigError(format!("Failed to render config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                NamingError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }
        std::fs::write(path, rendered).map_err(|e| {
            NamingError::ConfigError(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Build the layered settings, then take the environment table from
    /// `files` in order so its keys keep their case.
    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        files: &[PathBuf],
    ) -> Result<NamingConfig, NamingError> {
        let mut config: NamingConfig = builder.build()?.try_deserialize()?;
        config.environment.clear();
        for file in files {
            config.environment.extend(sources::read_environment_table(file)?);
        }
        config.ensure_valid()?;
        Ok(config)
    }
}

//! Logging System
//!
//! Structured logging using the `tracing` crate. The library itself only emits
//! events; embedders that want them rendered call [`init_logging`].

use crate::error::NamingError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output is "file")
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    ProjectDirs::from("", "", "remote-naming")
        .map(|dirs| dirs.data_dir().join("remote-naming.log"))
        .unwrap_or_else(|| PathBuf::from(".remote-naming/remote-naming.log"))
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.format != "json" && self.format != "text" {
            return Err(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                self.format
            ));
        }
        parse_output(&self.output)?;
        Ok(())
    }
}

/// Output destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
}

fn parse_output(output: &str) -> Result<Output, String> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        _ => Err(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr', or 'file')",
            output
        )),
    }
}

/// Logging settings once `NAMING_LOG*` overrides are applied
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedLogging {
    directives: Vec<String>,
    json: bool,
    output: Output,
    color: bool,
}

impl ResolvedLogging {
    /// Overlay the `NAMING_LOG*` variables, read through `var`, onto `config`.
    ///
    /// `NAMING_LOG` replaces the level and module directives outright;
    /// `NAMING_LOG_MODULES` adds `module=level` pairs on top of the config.
    fn resolve(
        config: &LoggingConfig,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, NamingError> {
        let directives = match var("NAMING_LOG") {
            Some(spec) => split_directives(&spec),
            None => {
                let mut directives = vec![config.level.clone()];
                let mut modules: Vec<_> = config.modules.iter().collect();
                modules.sort();
                directives.extend(
                    modules
                        .into_iter()
                        .map(|(module, level)| format!("{}={}", module, level)),
                );
                if let Some(extra) = var("NAMING_LOG_MODULES") {
                    directives.extend(split_directives(&extra));
                }
                directives
            }
        };

        let format = var("NAMING_LOG_FORMAT").unwrap_or_else(|| config.format.clone());
        let json = match format.as_str() {
            "json" => true,
            "text" => false,
            other => {
                return Err(NamingError::ConfigError(format!(
                    "Invalid log format: {} (must be 'json' or 'text')",
                    other
                )))
            }
        };

        let output = var("NAMING_LOG_OUTPUT").unwrap_or_else(|| config.output.clone());
        let output = parse_output(&output).map_err(NamingError::ConfigError)?;

        Ok(Self {
            directives,
            json,
            output,
            color: config.color && output != Output::File,
        })
    }

    fn env_filter(&self) -> Result<EnvFilter, NamingError> {
        EnvFilter::try_new(self.directives.join(","))
            .map_err(|e| NamingError::ConfigError(format!("Invalid log directive: {}", e)))
    }
}

fn split_directives(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .map(String::from)
        .collect()
}

/// Install the global tracing subscriber.
///
/// `NAMING_LOG`, `NAMING_LOG_MODULES`, `NAMING_LOG_FORMAT` and
/// `NAMING_LOG_OUTPUT` take precedence over `config`, which falls back to
/// [`LoggingConfig::default`]. Fails if a global subscriber is already
/// installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), NamingError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);
    let resolved = ResolvedLogging::resolve(config, |key| std::env::var(key).ok())?;

    let writer = match resolved.output {
        Output::Stdout => BoxMakeWriter::new(std::io::stdout),
        Output::Stderr => BoxMakeWriter::new(std::io::stderr),
        Output::File => BoxMakeWriter::new(Arc::new(open_log_file(&config.file)?)),
    };

    let registry = Registry::default().with(resolved.env_filter()?);
    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let installed = if resolved.json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer.with_ansi(resolved.color)).try_init()
    };

    installed.map_err(|e| NamingError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn open_log_file(path: &Path) -> Result<std::fs::File, NamingError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            NamingError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            NamingError::ConfigError(format!("Failed to open log file {}: {}", path.display(), e))
        })
}

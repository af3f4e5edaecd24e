// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;
use crate::errors::{Result, TreewatchError};

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "Treewatch.toml";

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| {
        TreewatchError::ConfigError(format!("reading config file at {path:?}: {err}"))
    })?;

    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and run basic validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolve the configuration to start from.
///
/// - An explicit path must exist.
/// - Otherwise [`DEFAULT_CONFIG_FILE`] in `dir` is used if present.
/// - Otherwise built-in defaults.
///
/// The result is not validated yet: command-line overrides are applied on
/// top of it first.
pub fn load_or_default(explicit: Option<&Path>, dir: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        debug!(path = ?candidate, "using config file from working directory");
        return load_from_path(&candidate);
    }

    debug!("no config file; using defaults");
    Ok(ConfigFile::default())
}

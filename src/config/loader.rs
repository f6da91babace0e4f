// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// An explicitly given path must exist. Without one, `Xcpilot.toml` in the
/// current directory is used if present, otherwise built-in defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        info!(path = ?path, "loading config");
        return load_and_validate(path);
    }

    let path = default_config_path();
    if path.is_file() {
        info!(path = ?path, "loading config");
        load_and_validate(&path)
    } else {
        debug!(path = ?path, "no config file found, using defaults");
        Ok(ConfigFile::default())
    }
}

/// `Xcpilot.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Xcpilot.toml")
}

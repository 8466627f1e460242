//! Configuration file handling for schemadrift.
//!
//! The file is given with `--config` (default `dbconf`). A path without an
//! extension that does not exist is retried with `.styx` appended.

pub use schemadrift_config::Config;

use std::path::{Path, PathBuf};

/// Load and validate the configuration at `path`.
pub fn load(path: &str) -> Result<(Config, PathBuf), ConfigError> {
    let config_path = find_config_file(Path::new(path))?;
    let content =
        std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io(e.to_string()))?;

    let config: Config =
        facet_styx::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config
        .validate()
        .map_err(|(set, field)| ConfigError::Invalid { set, field })?;

    Ok((config, config_path))
}

/// Resolve `path`, falling back to `<path>.styx` when it has no extension.
fn find_config_file(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    if path.extension().is_none() {
        let with_ext = path.with_extension("styx");
        if with_ext.is_file() {
            return Ok(with_ext);
        }
    }

    Err(ConfigError::NotFound(path.display().to_string()))
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Neither the path nor its `.styx` variant exists
    NotFound(String),
    /// I/O error reading the file
    Io(String),
    /// Parse error in the Styx file
    Parse(String),
    /// A required connection parameter is empty
    Invalid {
        set: &'static str,
        field: &'static str,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "could not find config file \"{}\"", path),
            ConfigError::Io(e) => write!(f, "failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config file: {}", e),
            ConfigError::Invalid { set, field } => {
                write!(f, "{}.{} must not be empty", set, field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

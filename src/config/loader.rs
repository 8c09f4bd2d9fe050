//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "Parse error in {}: {}", path.display(), e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Path of a profile's file: `<dir>/<profile>.toml`.
pub fn profile_path(dir: &Path, profile: &str) -> PathBuf {
    dir.join(format!("{}.toml", profile))
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    let config: ServiceConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the named profile from `dir`.
pub fn load_profile(dir: &Path, profile: &str) -> Result<ServiceConfig, ConfigError> {
    load_config(&profile_path(dir, profile))
}

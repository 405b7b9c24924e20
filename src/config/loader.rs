use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::paths::Paths;
use crate::config::schema::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Reads and parses the TOML config at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the config from [`Paths::config_file`], falling back to defaults when
/// the file does not exist.
pub fn load_default_config() -> Result<Config, ConfigError> {
    let path = Paths::config_file();
    if !path.exists() {
        debug!(path = %path.display(), "No config file found; using defaults");
        return Ok(Config::default());
    }
    load_config(&path)
}

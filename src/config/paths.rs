use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

const APP_DIR: &str = "herald";
const CONFIG_ENV: &str = "HERALD_CONFIG";
const STATE_ENV: &str = "HERALD_STATE";

/// Where herald reads its config file and writes its log file.
///
/// `HERALD_CONFIG` names the config file itself; `HERALD_STATE` names the
/// state directory.
pub struct Paths;

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },
}

impl Paths {
    /// `<config dir>/herald/config.toml`, e.g. `~/.config/herald/config.toml` on Linux.
    pub fn config_file() -> PathBuf {
        env_override(CONFIG_ENV).unwrap_or_else(|| {
            app_dir(dirs::config_dir(), ".config").join("config.toml")
        })
    }

    /// `~/.local/state/herald` on Linux; other platforms fall back to the local data dir.
    pub fn state_dir() -> PathBuf {
        env_override(STATE_ENV).unwrap_or_else(|| {
            app_dir(dirs::state_dir().or_else(dirs::data_local_dir), ".local/state")
        })
    }

    pub fn ensure_state_dir() -> Result<PathBuf, PathError> {
        let path = Self::state_dir();
        fs::create_dir_all(&path).map_err(|source| PathError::CreateDirectory {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn env_override(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Joins `herald` onto the platform dir, or onto `home_relative` under the home dir.
fn app_dir(platform_dir: Option<PathBuf>, home_relative: &str) -> PathBuf {
    platform_dir
        .or_else(|| dirs::home_dir().map(|home| home.join(home_relative)))
        .unwrap_or_else(|| PathBuf::from(home_relative))
        .join(APP_DIR)
}

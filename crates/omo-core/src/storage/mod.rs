mod accident_log;
mod config;

pub use accident_log::{AccidentLog, ACCIDENT_LOG_FILE};
pub use config::{Config, DrinkConfig, ModelConfig, SessionConfig, StorageConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns `~/.config/omo-tracker[-dev]/` based on OMO_TRACKER_ENV.
///
/// Set OMO_TRACKER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("OMO_TRACKER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("omo-tracker-dev")
    } else {
        base_dir.join("omo-tracker")
    };

    ensure_dir(&dir)?;
    Ok(dir)
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::DataDir {
        path: dir.to_path_buf(),
        source,
    })
}

pub mod capacity;
pub mod config;
pub mod track;

use std::error::Error;
use std::path::PathBuf;

use omo_core::storage;

/// `--data-dir` if given (created when missing), else the default data dir.
pub fn resolve_data_dir(arg: Option<PathBuf>) -> Result<PathBuf, Box<dyn Error>> {
    match arg {
        Some(dir) => {
            storage::ensure_dir(&dir)?;
            Ok(dir)
        }
        None => {
            let dir = storage::data_dir()?;
            tracing::debug!(dir = %dir.display(), "using default data dir");
            Ok(dir)
        }
    }
}

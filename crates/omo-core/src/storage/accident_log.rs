//! Append-only record of accident amounts.
//!
//! One amount in mL per line, no header. These are the only values that
//! outlive a tracking session; they seed the capacity estimate of the next
//! one. Resetting deletes the file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub const ACCIDENT_LOG_FILE: &str = "accidents.csv";

#[derive(Debug, Clone)]
pub struct AccidentLog {
    path: PathBuf,
}

impl AccidentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log at `<dir>/accidents.csv`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(ACCIDENT_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every recorded amount. A missing file is an empty log.
    ///
    /// Only the first comma-separated field of a line is read.
    pub fn load(&self) -> Result<Vec<f64>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        let mut amounts = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let field = line.split(',').next().unwrap_or("").trim();
            if field.is_empty() {
                continue;
            }
            let amount = field.parse::<f64>().map_err(|_| StorageError::Parse {
                path: self.path.clone(),
                line: idx + 1,
                value: field.to_string(),
            })?;
            amounts.push(amount);
        }
        tracing::info!(path = %self.path.display(), count = amounts.len(), "accident log loaded");
        Ok(amounts)
    }

    /// Append amounts, creating the file and its directory if needed.
    pub fn append(&self, amounts: &[f64]) -> Result<(), StorageError> {
        if amounts.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        let mut records = String::new();
        for amount in amounts {
            records.push_str(&format!("{amount}\n"));
        }
        file.write_all(records.as_bytes())
            .map_err(|source| self.io_error(source))?;

        tracing::info!(path = %self.path.display(), count = amounts.len(), "accidents appended");
        Ok(())
    }

    /// Forget every recorded accident.
    pub fn reset(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "accident log reset");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

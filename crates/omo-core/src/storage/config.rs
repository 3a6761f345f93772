//! TOML-based application configuration.
//!
//! Stores:
//! - Bladder model constants (half-life, default capacity, fullness quantum)
//! - Drink amount presets and quantization
//! - Session polling cadence and an optional fixed RNG seed
//! - An optional accident log location
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::accident_log::ACCIDENT_LOG_FILE;
use crate::bladder::{
    ModelParams, DEFAULT_CAPACITY_ML, DEFAULT_FULLNESS_QUANTUM, DEFAULT_HALF_LIFE_MIN,
};
use crate::error::{ConfigError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Bladder model constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_half_life")]
    pub half_life_min: f64,
    #[serde(default = "default_capacity")]
    pub default_capacity_ml: f64,
    #[serde(default = "default_quantum")]
    pub fullness_quantum: f64,
}

/// Drink amount presets, in mL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkConfig {
    #[serde(default = "default_drink")]
    pub default_ml: u32,
    #[serde(default = "default_min_drink")]
    pub min_ml: u32,
    #[serde(default = "default_max_drink")]
    pub max_ml: u32,
    #[serde(default = "default_drink_step")]
    pub step_ml: u32,
}

/// Tracking session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Fixed seed for permission rolls. Random when unset.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Accident log location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides `<data dir>/accidents.csv`.
    #[serde(default)]
    pub accident_log: Option<PathBuf>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub drink: DrinkConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// Default functions
fn default_half_life() -> f64 {
    DEFAULT_HALF_LIFE_MIN
}
fn default_capacity() -> f64 {
    DEFAULT_CAPACITY_ML
}
fn default_quantum() -> f64 {
    DEFAULT_FULLNESS_QUANTUM
}
fn default_drink() -> u32 {
    500
}
fn default_min_drink() -> u32 {
    50
}
fn default_max_drink() -> u32 {
    1000
}
fn default_drink_step() -> u32 {
    50
}
fn default_poll_interval() -> u64 {
    500
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            half_life_min: default_half_life(),
            default_capacity_ml: default_capacity(),
            fullness_quantum: default_quantum(),
        }
    }
}

impl Default for DrinkConfig {
    fn default() -> Self {
        Self {
            default_ml: default_drink(),
            min_ml: default_min_drink(),
            max_ml: default_max_drink(),
            step_ml: default_drink_step(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            rng_seed: None,
        }
    }
}

impl ModelConfig {
    pub fn params(&self) -> ModelParams {
        ModelParams {
            half_life_min: self.half_life_min,
            default_capacity_ml: self.default_capacity_ml,
            fullness_quantum: self.fullness_quantum,
        }
    }
}

impl DrinkConfig {
    /// Snap an amount to the nearest step, then into `[min_ml, max_ml]`.
    pub fn quantize(&self, ml: f64) -> f64 {
        let step = f64::from(self.step_ml.max(1));
        let snapped = (ml / step).round() * step;
        snapped.clamp(f64::from(self.min_ml), f64::from(self.max_ml))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => parse_number(value)
                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
            // Optional values are unset; "none" clears, numbers stay numbers.
            serde_json::Value::Null => {
                if value.eq_ignore_ascii_case("none") {
                    serde_json::Value::Null
                } else {
                    parse_number(value)
                        .unwrap_or_else(|| serde_json::Value::String(value.into()))
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            serde_json::Value::String(_) => {
                if value.eq_ignore_ascii_case("none") {
                    serde_json::Value::Null
                } else {
                    serde_json::Value::String(value.into())
                }
            }
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Load from `<dir>/config.toml`, writing defaults there if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the default config cannot be written to disk.
    pub fn load_in(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_in(dir)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to `<dir>/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_in(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        super::ensure_dir(dir)?;
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory. Returns error if the key is
    /// unknown or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values that would break the model or the drink presets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("model.half_life_min", self.model.half_life_min),
            ("model.default_capacity_ml", self.model.default_capacity_ml),
            ("model.fullness_quantum", self.model.fullness_quantum),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("must be a positive number, got {value}"),
                });
            }
        }
        if self.drink.step_ml == 0 {
            return Err(ConfigError::InvalidValue {
                key: "drink.step_ml".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.drink.min_ml > self.drink.max_ml {
            return Err(ConfigError::InvalidValue {
                key: "drink.min_ml".to_string(),
                message: format!("must not exceed drink.max_ml ({})", self.drink.max_ml),
            });
        }
        Ok(())
    }

    /// Where accidents are recorded for a given data directory.
    pub fn accident_log_path(&self, dir: &Path) -> PathBuf {
        self.storage
            .accident_log
            .clone()
            .unwrap_or_else(|| dir.join(ACCIDENT_LOG_FILE))
    }
}

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<u64>() {
        Some(serde_json::Value::Number(n.into()))
    } else if let Ok(n) = value.parse::<f64>() {
        serde_json::Number::from_f64(n).map(serde_json::Value::Number)
    } else {
        None
    }
}

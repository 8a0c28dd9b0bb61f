//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timing defaults for new exercises and the timer engine
//! - Notification preferences (bell, warning pulse)
//! - Tick driver settings
//!
//! Configuration is stored at `~/.config/fittimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{EngineConfig, DEFAULT_SECONDS_PER_REP};

/// Timing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_secs: u32,
    /// Work phase used for exercises with neither reps nor duration.
    #[serde(default = "default_work_secs")]
    pub default_work_secs: u32,
    #[serde(default = "default_seconds_per_rep")]
    pub seconds_per_rep: f64,
    #[serde(default = "default_sets")]
    pub default_sets: u32,
    #[serde(default = "default_reps")]
    pub default_reps: u32,
    #[serde(default = "default_rest_secs")]
    pub default_rest_secs: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ring the terminal bell on pulses.
    #[serde(default = "default_true")]
    pub bell: bool,
    /// Pulse on the countdown warning, not just on phase changes.
    #[serde(default = "default_true")]
    pub warning_pulse: bool,
}

/// Live tick driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/fittimer/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

// Default functions
fn default_warning_threshold() -> u32 {
    3
}
fn default_work_secs() -> u32 {
    30
}
fn default_seconds_per_rep() -> f64 {
    DEFAULT_SECONDS_PER_REP
}
fn default_sets() -> u32 {
    3
}
fn default_reps() -> u32 {
    12
}
fn default_rest_secs() -> u32 {
    60
}
fn default_true() -> bool {
    true
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            warning_threshold_secs: default_warning_threshold(),
            default_work_secs: default_work_secs(),
            seconds_per_rep: default_seconds_per_rep(),
            default_sets: default_sets(),
            default_reps: default_reps(),
            default_rest_secs: default_rest_secs(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
            warning_pulse: true,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl TimingConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            warning_threshold_secs: self.warning_threshold_secs,
            default_work_secs: self.default_work_secs,
        }
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

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(n) if n.is_f64() => value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as whole number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Set a config value by key without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the key's type.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.update(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("falling back to default config: {e}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timing.warning_threshold_secs, 3);
        assert_eq!(parsed.driver.tick_interval_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timing]\ndefault_rest_secs = 90\n").unwrap();
        assert_eq!(parsed.timing.default_rest_secs, 90);
        assert_eq!(parsed.timing.default_sets, 3);
        assert!(parsed.notifications.enabled);
    }

    #[test]
    fn get_nested_values() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timing.default_reps").as_deref(), Some("12"));
        assert_eq!(cfg.get("timing.seconds_per_rep").as_deref(), Some("2.5"));
        assert_eq!(cfg.get("notifications.bell").as_deref(), Some("true"));
        assert_eq!(cfg.get("timing.nope"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn update_preserves_types() {
        let mut cfg = Config::default();
        cfg.update("timing.default_rest_secs", "45").unwrap();
        cfg.update("timing.seconds_per_rep", "3").unwrap();
        cfg.update("notifications.bell", "false").unwrap();
        assert_eq!(cfg.timing.default_rest_secs, 45);
        assert_eq!(cfg.timing.seconds_per_rep, 3.0);
        assert!(!cfg.notifications.bell);
    }

    #[test]
    fn update_rejects_bad_input() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.update("timing.missing", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.update("timing.default_sets", "-2"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.update("notifications.enabled", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.update("driver.tick_interval_ms", "250").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().driver.tick_interval_ms, 250);
    }

    #[test]
    fn engine_config_from_timing() {
        let timing = TimingConfig {
            warning_threshold_secs: 5,
            default_work_secs: 20,
            ..TimingConfig::default()
        };
        let engine = timing.engine_config();
        assert_eq!(engine.warning_threshold_secs, 5);
        assert_eq!(engine.default_work_secs, 20);
    }
}

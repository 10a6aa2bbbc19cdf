//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default countdown length and frame cadence
//! - Time display options
//! - Which notifications the front ends should raise
//! - Stopwatch lap export format
//!
//! Configuration is stored at `~/.config/themetimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};
use crate::format::FormatOptions;
use crate::timer::{duration_errors, ExportFormat};

/// Timer defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default)]
    pub default_seconds: u32,
    /// Host refresh cadence in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

/// Time display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub show_milliseconds: bool,
    #[serde(default)]
    pub force_hours: bool,
    #[serde(default)]
    pub compact: bool,
    #[serde(default = "default_true")]
    pub show_leading_zero: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub warnings: bool,
    #[serde(default = "default_true")]
    pub milestones: bool,
}

/// Stopwatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopwatchConfig {
    #[serde(default = "default_export_format")]
    pub export_format: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/themetimer/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub stopwatch: StopwatchConfig,
}

// Default functions
fn default_minutes() -> u32 {
    5
}
fn default_frame_interval_ms() -> u64 {
    16
}
fn default_true() -> bool {
    true
}
fn default_export_format() -> String {
    "text".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            default_seconds: 0,
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_milliseconds: false,
            force_hours: false,
            compact: false,
            show_leading_zero: true,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warnings: true,
            milestones: true,
        }
    }
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            export_format: default_export_format(),
        }
    }
}

impl DisplayConfig {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            show_milliseconds: self.show_milliseconds,
            force_hours: self.force_hours,
            compact: self.compact,
            show_leading_zero: self.show_leading_zero,
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
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
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
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|_| {
                        ConfigError::ParseFailed(format!("cannot parse '{value}' as bool"))
                    })?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| {
                        ConfigError::ParseFailed(format!("cannot parse '{value}' as number"))
                    })?,
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by key. The change is validated but not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the timers would refuse later.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let errors = duration_errors(
            self.timer.default_minutes as i64,
            self.timer.default_seconds as i64,
        );
        if let Some(err) = errors.into_iter().next() {
            return Err(match err {
                ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
                    field: format!("timer.default_{field}"),
                    message,
                },
                other => other,
            });
        }
        if self.timer.frame_interval_ms == 0 {
            return Err(ValidationError::invalid(
                "timer.frame_interval_ms",
                "must be greater than zero",
            ));
        }
        self.stopwatch.export_format.parse::<ExportFormat>()?;
        Ok(())
    }

    /// Default countdown length in milliseconds.
    pub fn default_duration_ms(&self) -> u64 {
        (self.timer.default_minutes as u64 * 60 + self.timer.default_seconds as u64) * 1000
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

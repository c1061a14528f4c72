//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{IntSetting, Settings};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "TWIDDLECFG_CONFIG_DIR";

/// Overrides for the settings a text configuration starts from.
///
/// Binary files carry every setting in their header, so these only affect
/// text input. Unset fields keep the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    /// Format major version
    pub major_version: Option<u32>,
    /// Format minor version
    pub minor_version: Option<u32>,
    /// Milliseconds before mouse mode exits
    pub mouse_exit_delay: Option<u32>,
    /// Minimum milliseconds between twiddles
    pub ms_between_twiddles: Option<u32>,
    /// Initial mouse speed
    pub start_speed: Option<u32>,
    /// Fast mouse speed
    pub fast_speed: Option<u32>,
    /// Mouse acceleration factor
    pub mouse_acceleration: Option<u32>,
    /// Key repeat delay in milliseconds (multiple of 10)
    pub ms_repeat_delay: Option<u32>,
    /// Key repeat flag
    pub enable_repeat: Option<bool>,
    /// Mass storage flag
    pub enable_storage: Option<bool>,
}

impl DefaultSettings {
    /// Integer overrides paired with the setting they replace.
    fn int_overrides(&self) -> [(IntSetting, Option<u32>); 8] {
        [
            (IntSetting::MajorVersion, self.major_version),
            (IntSetting::MinorVersion, self.minor_version),
            (IntSetting::MouseExitDelay, self.mouse_exit_delay),
            (IntSetting::MsBetweenTwiddles, self.ms_between_twiddles),
            (IntSetting::StartSpeed, self.start_speed),
            (IntSetting::FastSpeed, self.fast_speed),
            (IntSetting::MouseAcceleration, self.mouse_acceleration),
            (IntSetting::MsRepeatDelay, self.ms_repeat_delay),
        ]
    }

    /// Built-in defaults with these overrides applied.
    #[must_use]
    pub fn baseline(&self) -> Settings {
        let mut settings = Settings::default();
        for (setting, value) in self.int_overrides() {
            if let Some(value) = value {
                settings.set(setting, value);
            }
        }
        if let Some(enabled) = self.enable_repeat {
            settings.set_repeat_enabled(enabled);
        }
        if let Some(enabled) = self.enable_storage {
            settings.set_storage_enabled(enabled);
        }
        settings
    }
}

/// Diagnostics preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Treat warnings as failures
    pub strict: bool,
    /// Default log level when neither `--verbose` nor `RUST_LOG` is given
    pub log_level: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            strict: false,
            log_level: "warn".to_string(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/TwiddlerConfig/config.toml`
/// - macOS: `~/Library/Application Support/TwiddlerConfig/config.toml`
/// - Windows: `%APPDATA%\TwiddlerConfig\config.toml`
///
/// # Validation
///
/// - Every default must fit its binary header field
/// - `ms_repeat_delay` must be a multiple of 10
/// - `log_level` must name a tracing level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Baseline settings for text input
    pub defaults: DefaultSettings,
    /// Diagnostics preferences
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/TwiddlerConfig/`
    /// - macOS: `~/Library/Application Support/TwiddlerConfig/`
    /// - Windows: `%APPDATA%\TwiddlerConfig\`
    ///
    /// `TWIDDLECFG_CONFIG_DIR` overrides the location.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("TwiddlerConfig");

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate().context(format!(
            "Invalid config file: {}",
            config_path.display()
        ))?;

        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit path.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        // Serialize to TOML
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("toml.tmp");

        // Write to temp file
        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        for (setting, value) in self.defaults.int_overrides() {
            let Some(value) = value else { continue };
            if value > setting.max_value() {
                anyhow::bail!(
                    "Default {setting} {value} does not fit its field (max {})",
                    setting.max_value()
                );
            }
        }

        if let Some(delay) = self.defaults.ms_repeat_delay {
            if delay % 10 != 0 {
                anyhow::bail!("Default MsRepeatDelay {delay} must be a multiple of 10");
            }
        }

        self.diagnostics
            .log_level
            .parse::<tracing::Level>()
            .map_err(|_| {
                anyhow::anyhow!(
                    "Invalid log level '{}' (expected trace, debug, info, warn or error)",
                    self.diagnostics.log_level
                )
            })?;

        Ok(())
    }

    /// Baseline settings for reading text configurations.
    #[must_use]
    pub fn baseline_settings(&self) -> Settings {
        self.defaults.baseline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert!(!config.diagnostics.strict);
        assert_eq!(config.diagnostics.log_level, "warn");
        assert_eq!(config.baseline_settings(), Settings::default());
    }

    #[test]
    fn test_config_validate() {
        let config = Config::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_repeat_delay() {
        let mut config = Config::new();
        config.defaults.ms_repeat_delay = Some(125);
        assert!(config.validate().is_err());

        config.defaults.ms_repeat_delay = Some(2560);
        assert!(config.validate().is_err());

        config.defaults.ms_repeat_delay = Some(250);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_field_width() {
        let mut config = Config::new();
        config.defaults.start_speed = Some(300);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_log_level() {
        let mut config = Config::new();
        config.diagnostics.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        config.diagnostics.log_level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_baseline_applies_overrides() {
        let mut config = Config::new();
        config.defaults.fast_speed = Some(9);
        config.defaults.enable_storage = Some(true);

        let settings = config.baseline_settings();
        assert_eq!(settings.get(IntSetting::FastSpeed), 9);
        assert!(settings.storage_enabled());
        assert!(settings.is_default(IntSetting::StartSpeed));
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");

        let mut config = Config::new();
        config.defaults.mouse_exit_delay = Some(2000);
        config.diagnostics.strict = true;

        config.save_to(&config_file).unwrap();
        assert!(!config_file.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[defaults]\nstart_speed = 4\n").unwrap();

        let loaded = Config::load_from(&config_file).unwrap();
        assert_eq!(loaded.defaults.start_speed, Some(4));
        assert_eq!(loaded.diagnostics, DiagnosticsConfig::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::new());
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[defaults]\nms_repeat_delay = 15\n").unwrap();
        assert!(Config::load_from(&config_file).is_err());
    }
}

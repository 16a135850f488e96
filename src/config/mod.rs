//! Configuration module for serialplot-rs
//!
//! This module handles application configuration:
//! - Serial link settings (last used port, baud rate, read timeout)
//! - Plot and UI preferences
//! - The poll interval of the session loop
//!
//! Plotted data is never persisted; only settings are.
//!
//! # Config Location
//!
//! The configuration file is stored in the platform-appropriate location:
//! - **Linux**: `~/.config/serialplot-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/serialplot-rs/config.toml`
//! - **Windows**: `%APPDATA%\serialplot-rs\config.toml`
//!
//! Log files go to the matching data directory.
//!
//! # Example
//!
//! ```ignore
//! use serialplot_rs::config::AppConfig;
//!
//! let mut config = AppConfig::load_or_default();
//! config.serial.baud_rate = 230_400;
//! config.save_default()?;
//! ```

use crate::error::{Result, SerialPlotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for config and data directories
pub const APP_ID: &str = "serialplot-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default poll interval of the session loop in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

/// Default driver read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10;

/// Default number of raw lines kept for the log panel
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Baud rates offered in the UI
pub const BAUD_RATES: &[u32] = &[
    9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 460_800, 921_600,
];

// ==================== Directories ====================

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Get the application data directory path (log files)
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        SerialPlotError::Config("Could not determine app data directory".to_string())
    })?;
    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            SerialPlotError::Config(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;
    }
    Ok(())
}

// ==================== Serial Config ====================

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Last selected port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Driver read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

// ==================== UI Config ====================

/// Plot and window preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show the legend
    #[serde(default = "default_true")]
    pub show_legend: bool,

    /// Show grid lines
    #[serde(default = "default_true")]
    pub show_grid: bool,

    /// Line width for all traces
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Use dark theme
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Show the raw line log panel
    #[serde(default)]
    pub show_log: bool,

    /// Raw lines kept for the log panel
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Points drawn per trace; older samples are thinned for display only
    #[serde(default = "default_max_render_points")]
    pub max_render_points: usize,
}

fn default_true() -> bool {
    true
}

fn default_line_width() -> f32 {
    1.5
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_max_render_points() -> usize {
    crate::types::MAX_RENDER_POINTS
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            show_grid: true,
            line_width: 1.5,
            dark_mode: true,
            show_log: false,
            log_capacity: DEFAULT_LOG_CAPACITY,
            max_render_points: crate::types::MAX_RENDER_POINTS,
        }
    }
}

// ==================== App Config ====================

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interval between session polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Serial link settings
    #[serde(default)]
    pub serial: SerialConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            serial: SerialConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SerialPlotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            SerialPlotError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load config from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to a file, creating its directory if needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SerialPlotError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            SerialPlotError::Config(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Save config to the default location
    pub fn save_default(&self) -> Result<()> {
        let path = config_path().ok_or_else(|| {
            SerialPlotError::Config("Could not determine config path".to_string())
        })?;
        self.save(path)
    }

    /// Poll interval as a duration, never zero
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.serial.baud_rate, 115_200);
        assert!(config.serial.port.is_none());
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert!(BAUD_RATES.contains(&config.serial.baud_rate));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.serial.port = Some("/dev/ttyACM0".to_string());
        config.serial.baud_rate = 9_600;
        config.ui.show_log = true;

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[serial]\nport = \"COM3\"\n").unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.serial.port.as_deref(), Some("COM3"));
        assert_eq!(loaded.serial.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(loaded.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(loaded.ui, UiConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "poll_interval_ms = \"fast\"").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, SerialPlotError::Config(_)));
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = AppConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}

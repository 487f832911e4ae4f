//! Configuration file support.
//!
//! Editor tuning, export defaults and logging verbosity, stored as JSON.

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_BOX_SIZE, OVERLAP_THRESHOLD};
use crate::export::SaveStrategy;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Box editing behaviour
    #[serde(default)]
    pub editor: EditorSettings,

    /// Dataset export defaults
    #[serde(default)]
    pub export: ExportSettings,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Box editing section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Smallest width/height a drawn or resized box may have, in pixels
    #[serde(default = "default_min_box_size")]
    pub min_box_size: f32,

    /// Overlap ratio (of the smaller box) above which a conflict is raised
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f32,
}

fn default_min_box_size() -> f32 {
    MIN_BOX_SIZE
}

fn default_overlap_threshold() -> f32 {
    OVERLAP_THRESHOLD
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            min_box_size: default_min_box_size(),
            overlap_threshold: default_overlap_threshold(),
        }
    }
}

/// Export section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Strategy preselected in the save menu
    #[serde(default)]
    pub default_strategy: SaveStrategy,

    /// Score threshold in percent, if filtering is on by default
    #[serde(default)]
    pub default_threshold: Option<f32>,
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            editor: EditorSettings::default(),
            export: ExportSettings::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let EditorSettings {
            min_box_size,
            overlap_threshold,
        } = self.editor;
        if !min_box_size.is_finite() || min_box_size < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "editor.min_box_size",
                value: min_box_size,
            });
        }
        if !(0.0..=1.0).contains(&overlap_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "editor.overlap_threshold",
                value: overlap_threshold,
            });
        }
        Ok(())
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "orchid-editor.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("orchid-editor").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("orchid-editor")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is outside its allowed range
    #[error("Invalid value {value} for '{field}'")]
    InvalidValue { field: &'static str, value: f32 },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

//! Configuration file handling for cam2ascii.
//!
//! Loads configuration from `~/.config/cam2ascii/config.toml` or a custom
//! path, and merges it with command-line flags into an immutable [`Settings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::camera::{FormatPolicy, SizePolicy};
use crate::cli::Args;

pub const DEFAULT_DEVICE: &str = "/dev/video0";
pub const DEFAULT_WIDTH: u16 = 320;
pub const DEFAULT_HEIGHT: u16 = 90;
pub const DEFAULT_FPS: u32 = 13;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_QUEUE_DEPTH: usize = 2;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub path: Option<PathBuf>,
    /// "first" or a fourcc such as "MJPG"
    pub format: Option<FormatPolicy>,
    /// "largest" or "smallest"
    pub size: Option<SizePolicy>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub fps: Option<u32>,
    pub queue_depth: Option<usize>,
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// path is used and a missing file yields the default config.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_file(path)
            }
            None => {
                let path = default_path();
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("cam2ascii").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/cam2ascii/config.toml")
        })
}

/// Resolved, validated settings. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub device: PathBuf,
    /// ASCII grid width in characters
    pub width: u16,
    /// ASCII grid height in characters
    pub height: u16,
    /// Target display rate
    pub fps: u32,
    /// Longest single wait for a frame before a timeout is reported
    pub wait_timeout: Duration,
    /// Frames the output queue holds before new ones are dropped
    pub queue_depth: usize,
    pub format: FormatPolicy,
    pub size: SizePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            wait_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            format: FormatPolicy::default(),
            size: SizePolicy::default(),
        }
    }
}

impl Settings {
    /// Merge settings: CLI args > config file > built-in defaults.
    pub fn resolve(args: &Args, config: &Config) -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        let timeout_secs = args
            .timeout
            .or(config.device.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let settings = Settings {
            device: args
                .device
                .clone()
                .or_else(|| config.device.path.clone())
                .unwrap_or(defaults.device),
            width: args.width.or(config.display.width).unwrap_or(defaults.width),
            height: args.height.or(config.display.height).unwrap_or(defaults.height),
            fps: args.fps.or(config.display.fps).unwrap_or(defaults.fps),
            wait_timeout: Duration::from_secs(timeout_secs),
            queue_depth: args
                .queue_depth
                .or(config.display.queue_depth)
                .unwrap_or(defaults.queue_depth),
            format: args.format.or(config.device.format).unwrap_or(defaults.format),
            size: args.size.or(config.device.size).unwrap_or(defaults.size),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be at least 1".to_string()));
        }
        if self.wait_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "queue depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

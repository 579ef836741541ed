//! TOML-based configuration for cursorlink.
//!
//! Settings are read from `config.toml` in the platform config directory:
//! - Linux:  `$XDG_CONFIG_HOME/cursorlink/config.toml` or `~/.config/cursorlink/config.toml`
//! - macOS:  `~/Library/Application Support/cursorlink/config.toml`
//!
//! A different file can be named with `--config`. Every field is optional;
//! anything missing falls back to the built-in default, and a missing default
//! file is the same as an empty one.
//!
//! ```toml
//! [serial]
//! device = "/dev/ttyUSB0"
//! baud_rate = 115200
//! parity = "none"
//! blocking_reads = false
//!
//! [pointer]
//! width = 640
//! height = 480
//! on_missing = "hold-last"
//!
//! [stream]
//! interval_us = 16666
//! log_level = "debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use cursorlink_core::{Resolution, ResolutionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::stream_pointer::{MissingSamplePolicy, StreamSettings};
use crate::infrastructure::serial::{Parity, SerialSettings, DEFAULT_BAUD_RATE, DEFAULT_DEVICE};

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The target resolution is out of range.
    #[error("invalid pointer resolution: {0}")]
    Resolution(#[from] ResolutionError),

    /// A zero poll interval would spin the loop.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Serial device and line settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Path to the serial character device.
    #[serde(default = "default_device")]
    pub device: PathBuf,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default)]
    pub parity: Parity,
    /// `VMIN = 1` instead of timed reads.
    #[serde(default)]
    pub blocking_reads: bool,
}

/// Target resolution and missing-sample handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointerConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub on_missing: MissingSamplePolicy,
}

/// Loop timing and logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamConfig {
    /// Pause after each frame, in microseconds.
    #[serde(default = "default_interval_us")]
    pub interval_us: u64,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_device() -> PathBuf {
    PathBuf::from(DEFAULT_DEVICE)
}
fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_width() -> u32 {
    u32::from(Resolution::VGA.width())
}
fn default_height() -> u32 {
    u32::from(Resolution::VGA.height())
}
fn default_interval_us() -> u64 {
    16_666
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud_rate: default_baud_rate(),
            parity: Parity::default(),
            blocking_reads: false,
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            on_missing: MissingSamplePolicy::default(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_us: default_interval_us(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Line settings for [`crate::infrastructure::serial::SerialPort::open`].
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            baud_rate: self.serial.baud_rate,
            parity: self.serial.parity,
            blocking_reads: self.serial.blocking_reads,
        }
    }

    /// Validated loop settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Resolution`] or [`ConfigError::ZeroInterval`].
    pub fn stream_settings(&self, max_polls: Option<u64>) -> Result<StreamSettings, ConfigError> {
        if self.stream.interval_us == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(StreamSettings {
            resolution: Resolution::new(self.pointer.width, self.pointer.height)?,
            interval: Duration::from_micros(self.stream.interval_us),
            on_missing: self.pointer.on_missing,
            max_polls,
        })
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if no base directory can be
/// derived from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration.
///
/// An explicit `path` must exist. Without one, the default path is tried and
/// a missing file (or an undeterminable config directory) yields defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = path {
        return read_config(path);
    }

    let Ok(path) = config_file_path() else {
        return Ok(AppConfig::default());
    };
    match read_config(&path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(AppConfig::default())
        }
        other => other,
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("cursorlink")
        })
    }

    #[cfg(not(target_os = "macos"))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("cursorlink"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

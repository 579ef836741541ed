//! Serial port configurator and byte sink.
//!
//! Opens a character device, puts it into raw 8-bit mode at a fixed baud
//! rate, and exposes it as a [`FrameSink`] that performs one `write(2)` per
//! byte.
//!
//! # Line settings
//!
//! | Setting        | Value                                           |
//! |----------------|-------------------------------------------------|
//! | Baud rate      | configurable, default 9600                      |
//! | Data bits      | 8                                               |
//! | Parity         | configurable, default none                      |
//! | Stop bits      | 1                                               |
//! | Flow control   | none (hardware and XON/XOFF disabled)           |
//! | Line mode      | raw: no echo, no canonical input, no signals    |
//! | Reads          | `VMIN = 0`, `VTIME = 5` (0.5 s); `VMIN = 1` when blocking |
//!
//! The attribute transform itself lives in [`termios`] so it can be checked
//! against a pseudo-terminal in tests.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::termios::ControlFlags;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::stream_pointer::{FrameSink, SinkError};

pub mod dry_run;
pub mod mock;
pub mod termios;

pub use dry_run::DryRunSink;
pub use termios::{apply_line_settings, baud_rate_constant, configure_port, set_blocking};

/// Bluetooth SPP device the reference board pairs as.
pub const DEFAULT_DEVICE: &str = "/dev/tty.RNBT-EB90-RNI-SPP";

pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout in tenths of a second (`VTIME`).
pub const READ_TIMEOUT_DECISECONDS: u8 = 5;

/// Error type for serial port setup.
#[derive(Debug, Error)]
pub enum SerialError {
    /// The device file could not be opened.
    #[error("cannot open serial device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `tcgetattr` failed.
    #[error("tcgetattr failed: {0}")]
    GetAttributes(#[source] Errno),

    /// `tcsetattr` failed.
    #[error("tcsetattr failed: {0}")]
    SetAttributes(#[source] Errno),

    /// `cfsetispeed`/`cfsetospeed` rejected the speed.
    #[error("setting line speed failed: {0}")]
    SetSpeed(#[source] Errno),

    /// The numeric baud rate has no termios speed constant.
    #[error("unsupported baud rate {0}")]
    UnsupportedBaudRate(u32),
}

/// Parity mode of the serial line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl Parity {
    /// Control flags to OR in after `PARENB | PARODD` have been cleared.
    pub fn control_flags(self) -> ControlFlags {
        match self {
            Parity::None => ControlFlags::empty(),
            Parity::Even => ControlFlags::PARENB,
            Parity::Odd => ControlFlags::PARENB | ControlFlags::PARODD,
        }
    }
}

impl FromStr for Parity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Parity::None),
            "even" => Ok(Parity::Even),
            "odd" => Ok(Parity::Odd),
            other => Err(format!(
                "unknown parity '{other}' (expected 'none', 'even' or 'odd')"
            )),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Parity::None => "none",
            Parity::Even => "even",
            Parity::Odd => "odd",
        })
    }
}

/// Line settings applied when the port is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub parity: Parity,
    /// `true` sets `VMIN = 1` so reads wait for at least one byte.
    pub blocking_reads: bool,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
            blocking_reads: false,
        }
    }
}

/// An open, configured serial device.
///
/// The file descriptor is closed when the port is dropped.
pub struct SerialPort {
    file: File,
    path: PathBuf,
}

impl SerialPort {
    /// Opens `path` read/write without becoming its controlling terminal and
    /// applies `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::Open`] if the device cannot be opened, or any
    /// attribute error from [`configure_port`].
    pub fn open(path: impl AsRef<Path>, settings: &SerialSettings) -> Result<Self, SerialError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags((OFlag::O_NOCTTY | OFlag::O_SYNC).bits())
            .open(&path)
            .map_err(|source| SerialError::Open {
                path: path.clone(),
                source,
            })?;

        configure_port(&file, settings)?;
        info!(
            device = %path.display(),
            baud = settings.baud_rate,
            parity = %settings.parity,
            blocking_reads = settings.blocking_reads,
            "serial port configured"
        );

        Ok(Self { file, path })
    }

    /// Switches between blocking (`VMIN = 1`) and timed (`VMIN = 0`) reads.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::GetAttributes`] or [`SerialError::SetAttributes`].
    pub fn set_blocking(&self, blocking: bool) -> Result<(), SerialError> {
        set_blocking(&self.file, blocking)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink for SerialPort {
    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError> {
        match self.file.write(&[byte])? {
            1 => Ok(()),
            written => Err(SinkError::ShortWrite { written }),
        }
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        debug!(device = %self.path.display(), "closing serial port");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! cursorlink: entry point.
//!
//! Streams the pointer position over a serial line until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! cursorlink [OPTIONS]
//!
//! Options:
//!   --config <PATH>         Config file [default: ~/.config/cursorlink/config.toml]
//!   --device <PATH>         Serial device [default: /dev/tty.RNBT-EB90-RNI-SPP]
//!   --baud <N>              Baud rate [default: 9600]
//!   --parity <MODE>         none | even | odd [default: none]
//!   --width <N>             Board width in pixels [default: 640]
//!   --height <N>            Board height in pixels [default: 480]
//!   --interval-us <N>       Pause between frames [default: 16666]
//!   --blocking-reads        Configure VMIN = 1
//!   --on-missing <POLICY>   skip | hold-last [default: skip]
//!   --polls <N>             Stop after N iterations
//!   --dry-run               Do not open the device; count bytes instead
//! ```
//!
//! # Precedence
//!
//! Command-line flags (and their `CURSORLINK_*` environment variables) win
//! over the config file, which wins over built-in defaults.
//!
//! | Variable                  | Flag              |
//! |---------------------------|-------------------|
//! | `CURSORLINK_CONFIG`       | `--config`        |
//! | `CURSORLINK_DEVICE`       | `--device`        |
//! | `CURSORLINK_BAUD`         | `--baud`          |
//! | `CURSORLINK_PARITY`       | `--parity`        |
//! | `CURSORLINK_WIDTH`        | `--width`         |
//! | `CURSORLINK_HEIGHT`       | `--height`        |
//! | `CURSORLINK_INTERVAL_US`  | `--interval-us`   |
//! | `CURSORLINK_ON_MISSING`   | `--on-missing`    |
//!
//! Log verbosity comes from `RUST_LOG`, falling back to `stream.log_level`.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cursorlink::application::stream_pointer::{
    FrameSink, MissingSamplePolicy, PointerSource, PointerStreamer, StreamSettings, StreamStats,
};
use cursorlink::infrastructure::pointer::NativePointerSource;
use cursorlink::infrastructure::serial::{DryRunSink, Parity, SerialPort};
use cursorlink::infrastructure::storage::{load_config, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Streams the pointer position to a serial-attached board.
///
/// Every option is optional; unset options fall back to the config file and
/// then to the built-in defaults.
#[derive(Debug, Parser)]
#[command(
    name = "cursorlink",
    about = "Stream the pointer position over a serial line as 4-byte frames",
    version
)]
struct Cli {
    /// Config file to read instead of the default location.
    ///
    /// Unlike the default location, a path given here must exist.
    #[arg(long, env = "CURSORLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Serial character device.
    #[arg(long, env = "CURSORLINK_DEVICE")]
    device: Option<PathBuf>,

    /// Line speed in baud.
    #[arg(long, env = "CURSORLINK_BAUD")]
    baud: Option<u32>,

    /// Parity: none, even or odd.
    #[arg(long, env = "CURSORLINK_PARITY")]
    parity: Option<Parity>,

    /// Horizontal resolution the samples are clamped into.
    #[arg(long, env = "CURSORLINK_WIDTH")]
    width: Option<u32>,

    /// Vertical resolution the samples are clamped into.
    #[arg(long, env = "CURSORLINK_HEIGHT")]
    height: Option<u32>,

    /// Pause after each frame, in microseconds.
    #[arg(long, env = "CURSORLINK_INTERVAL_US")]
    interval_us: Option<u64>,

    /// Configure reads to wait for at least one byte (VMIN = 1).
    #[arg(long)]
    blocking_reads: bool,

    /// What to send when the pointer cannot be sampled: skip or hold-last.
    #[arg(long, env = "CURSORLINK_ON_MISSING")]
    on_missing: Option<MissingSamplePolicy>,

    /// Stop after this many loop iterations.
    #[arg(long)]
    polls: Option<u64>,

    /// Sample and encode as usual but write to nothing.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Overlays the flags that were given onto `config`.
    fn merge_into(&self, mut config: AppConfig) -> AppConfig {
        if let Some(device) = &self.device {
            config.serial.device = device.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(parity) = self.parity {
            config.serial.parity = parity;
        }
        if self.blocking_reads {
            config.serial.blocking_reads = true;
        }
        if let Some(width) = self.width {
            config.pointer.width = width;
        }
        if let Some(height) = self.height {
            config.pointer.height = height;
        }
        if let Some(policy) = self.on_missing {
            config.pointer.on_missing = policy;
        }
        if let Some(interval_us) = self.interval_us {
            config.stream.interval_us = interval_us;
        }
        config
    }

    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let file_config = load_config(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("failed to load config file {}", path.display()),
            None => "failed to load default config file".to_string(),
        })?;
        Ok(self.merge_into(file_config))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed and merged over the config file.
/// 2. `tracing_subscriber` is initialised from `RUST_LOG` or the config's
///    `log_level`.
/// 3. The serial device is opened and configured. Failure here exits
///    non-zero before any pointer sampling happens.
/// 4. A Ctrl+C handler is spawned that clears the shared `running` flag.
/// 5. The streaming loop runs until the flag is cleared (or `--polls` is hit),
///    then the port is closed.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.stream.log_level)),
        )
        .init();

    let settings = config
        .stream_settings(cli.polls)
        .context("invalid stream settings")?;

    info!("cursorlink {} starting", env!("CARGO_PKG_VERSION"));

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    let source = NativePointerSource::new();

    if cli.dry_run {
        info!("dry run: serial device will not be opened");
        let (stats, sink) = stream(source, DryRunSink::new(), settings, &running).await;
        info!(bytes = sink.bytes(), frames = stats.sent, "dry run finished");
    } else {
        let port = open_sink(&config)?;
        let (_, port) = stream(source, port, settings, &running).await;
        drop(port);
        info!("serial port closed");
    }

    info!("cursorlink stopped");
    Ok(())
}

/// Opens and configures the serial device named in `config`.
///
/// # Errors
///
/// Returns an error naming the device if it cannot be opened or its line
/// settings cannot be applied.
fn open_sink(config: &AppConfig) -> anyhow::Result<SerialPort> {
    let device = &config.serial.device;
    SerialPort::open(device, &config.serial_settings())
        .with_context(|| format!("failed to set up serial device {}", device.display()))
}

/// Runs the streaming loop to completion and hands back the sink.
async fn stream<P, S>(
    source: P,
    sink: S,
    settings: StreamSettings,
    running: &AtomicBool,
) -> (StreamStats, S)
where
    P: PointerSource,
    S: FrameSink,
{
    let mut streamer = PointerStreamer::new(source, sink, settings);
    let stats = streamer.run(running).await;
    let (_, sink) = streamer.into_parts();
    (stats, sink)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

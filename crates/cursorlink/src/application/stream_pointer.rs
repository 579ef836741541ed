//! StreamPointerUseCase: polls the pointer and streams it to the board.
//!
//! Each iteration of the loop:
//!
//! ```text
//! PointerSource::query_position ──► clamp ──► EncodedFrame ──► FrameSink (1 byte at a time)
//!                                                                  │
//!                                             sleep(interval) ◄────┘
//! ```
//!
//! Bytes are written individually. The first failed or short write abandons
//! the rest of that frame; nothing is retried or buffered, and the loop
//! simply moves on to the next sample.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cursorlink_core::{EncodedFrame, PointerSample, RawPosition, Resolution};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Poll interval targeting roughly 60 Hz.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(16_666);

/// Error type for pointer queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// The display connection could not be opened.
    #[error("cannot open X display (DISPLAY={display})")]
    DisplayUnavailable { display: String },

    /// The window manager does not publish `_NET_ACTIVE_WINDOW`.
    #[error("window manager does not publish _NET_ACTIVE_WINDOW")]
    ActiveWindowUnsupported,

    /// The active-window property is empty or names no window.
    #[error("no window is currently focused")]
    NoActiveWindow,

    /// The pointer is on a different screen than the active window.
    #[error("pointer is not on the active window's screen")]
    PointerOffScreen,

    /// The display server rejected a request (e.g. the window just closed).
    #[error("X request {request} failed with error code {code}")]
    Protocol { request: &'static str, code: u8 },

    /// No pointer backend exists for this platform.
    #[error("pointer sampling is not supported on this platform")]
    Unsupported,
}

/// Error type for single-byte writes.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The write call returned a count other than 1.
    #[error("short write: {written} of 1 byte accepted")]
    ShortWrite { written: usize },

    /// The write call failed outright.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of raw pointer positions.
pub trait PointerSource {
    /// Returns the pointer position relative to the active window.
    fn query_position(&mut self) -> Result<RawPosition, PointerError>;
}

/// Destination for encoded frame bytes.
pub trait FrameSink {
    /// Writes exactly one byte.
    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError>;
}

/// What to send when the pointer cannot be sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingSamplePolicy {
    /// Send nothing this iteration.
    #[default]
    Skip,
    /// Resend the last good sample, if there is one.
    HoldLast,
}

impl FromStr for MissingSamplePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "hold-last" => Ok(Self::HoldLast),
            other => Err(format!(
                "unknown missing-sample policy '{other}' (expected 'skip' or 'hold-last')"
            )),
        }
    }
}

impl fmt::Display for MissingSamplePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skip => "skip",
            Self::HoldLast => "hold-last",
        })
    }
}

/// Loop settings threaded in at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    /// Resolution the samples are clamped into.
    pub resolution: Resolution,
    /// Pause after each iteration.
    pub interval: Duration,
    /// Behaviour when the pointer query fails.
    pub on_missing: MissingSamplePolicy,
    /// Stop after this many iterations; `None` runs until shutdown.
    pub max_polls: Option<u64>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::VGA,
            interval: DEFAULT_POLL_INTERVAL,
            on_missing: MissingSamplePolicy::Skip,
            max_polls: None,
        }
    }
}

/// Outcome of a single loop iteration.
#[derive(Debug)]
pub enum TickReport {
    /// All four bytes were written. `held` is set when the sample was a
    /// resend of the last good position.
    Sent { sample: PointerSample, held: bool },
    /// The frame was abandoned after `written` bytes.
    Partial {
        sample: PointerSample,
        written: usize,
        error: SinkError,
    },
    /// No sample was available, nothing was written.
    Skipped { reason: PointerError },
}

/// Running totals, logged when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub sent: u64,
    pub partial: u64,
    pub skipped: u64,
}

/// The pointer streaming use case.
///
/// Owns both the source and the sink for its whole lifetime; dropping the
/// streamer closes the serial port.
pub struct PointerStreamer<P, S> {
    source: P,
    sink: S,
    settings: StreamSettings,
    last_sample: Option<PointerSample>,
    missing_streak: u64,
    stats: StreamStats,
}

impl<P: PointerSource, S: FrameSink> PointerStreamer<P, S> {
    pub fn new(source: P, sink: S, settings: StreamSettings) -> Self {
        Self {
            source,
            sink,
            settings,
            last_sample: None,
            missing_streak: 0,
            stats: StreamStats::default(),
        }
    }

    /// Runs one iteration without sleeping.
    pub fn tick(&mut self) -> TickReport {
        let (sample, held) = match self.source.query_position() {
            Ok(raw) => {
                if self.missing_streak > 0 {
                    info!(missed = self.missing_streak, "pointer sampling recovered");
                    self.missing_streak = 0;
                }
                let sample = PointerSample::from_raw(raw, self.settings.resolution);
                self.last_sample = Some(sample);
                (sample, false)
            }
            Err(reason) => {
                self.note_missing(&reason);
                match (self.settings.on_missing, self.last_sample) {
                    (MissingSamplePolicy::HoldLast, Some(last)) => (last, true),
                    _ => {
                        self.stats.skipped += 1;
                        return TickReport::Skipped { reason };
                    }
                }
            }
        };

        info!("cursor at: {sample}");
        match self.send_frame(EncodedFrame::encode(sample)) {
            Ok(()) => {
                self.stats.sent += 1;
                TickReport::Sent { sample, held }
            }
            Err((written, error)) => {
                self.stats.partial += 1;
                TickReport::Partial {
                    sample,
                    written,
                    error,
                }
            }
        }
    }

    /// Loops until `running` is cleared or `max_polls` is reached.
    pub async fn run(&mut self, running: &AtomicBool) -> StreamStats {
        info!(
            resolution = %self.settings.resolution,
            interval_us = self.settings.interval.as_micros() as u64,
            on_missing = %self.settings.on_missing,
            "beginning pointer stream"
        );

        let mut polls = 0u64;
        while running.load(Ordering::Relaxed) {
            if self.settings.max_polls.is_some_and(|max| polls >= max) {
                break;
            }
            self.tick();
            polls += 1;
            tokio::time::sleep(self.settings.interval).await;
        }

        info!(
            polls,
            sent = self.stats.sent,
            partial = self.stats.partial,
            skipped = self.stats.skipped,
            "pointer stream stopped"
        );
        self.stats
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (P, S) {
        (self.source, self.sink)
    }

    /// Writes the frame one byte at a time, stopping at the first failure.
    fn send_frame(&mut self, frame: EncodedFrame) -> Result<(), (usize, SinkError)> {
        for (written, byte) in frame.into_iter().enumerate() {
            if let Err(error) = self.sink.write_byte(byte) {
                warn!(written, "write failed, dropping rest of frame: {error}");
                return Err((written, error));
            }
            info!("write: {byte:08b}");
        }
        Ok(())
    }

    /// Warns on the first miss of a streak; later misses go to debug.
    fn note_missing(&mut self, reason: &PointerError) {
        self.missing_streak += 1;
        if self.missing_streak == 1 {
            warn!(policy = %self.settings.on_missing, "no pointer sample: {reason}");
        } else {
            debug!(streak = self.missing_streak, "no pointer sample: {reason}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Pointer sample model and the two-tier coordinate clamp.
//!
//! The display server reports pointer coordinates as signed integers relative
//! to the active window. A pointer just outside the window yields small
//! negative numbers; a pointer far to the right or bottom of a large window
//! yields values beyond the target device's resolution. The receiving board
//! only addresses `[0, width-1] x [0, height-1]`, so every raw position is
//! folded into that range before encoding:
//!
//! ```text
//! raw (i32) ──truncate──► u16 ──┬─ > 32768          → 0          (near edge)
//!                               ├─ bound ..= 32768  → bound - 1  (far edge)
//!                               └─ otherwise        → unchanged
//! ```
//!
//! Truncation wraps (two's complement), so `-1` becomes `65535` and lands in
//! the first tier.

use std::fmt;

use thiserror::Error;

/// Truncated values strictly above this are treated as wrapped negatives.
pub const NEGATIVE_ARTIFACT_THRESHOLD: u16 = 32768;

/// Error returned when a [`Resolution`] bound is out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// A width or height of zero leaves no addressable pixel.
    #[error("{axis} must be at least 1 pixel")]
    Empty { axis: &'static str },

    /// Bounds above the artifact threshold would overlap the near-edge tier.
    #[error("{axis} of {value} exceeds the maximum of {}", NEGATIVE_ARTIFACT_THRESHOLD)]
    TooLarge { axis: &'static str, value: u32 },
}

/// Target virtual resolution of the receiving device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u16,
    height: u16,
}

impl Resolution {
    /// The 640x480 VGA mode driven by the reference board.
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// Creates a resolution, rejecting bounds outside `1..=32768`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] naming the offending axis.
    pub fn new(width: u32, height: u32) -> Result<Self, ResolutionError> {
        Ok(Self {
            width: check_bound("width", width)?,
            height: check_bound("height", height)?,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn check_bound(axis: &'static str, value: u32) -> Result<u16, ResolutionError> {
    match value {
        0 => Err(ResolutionError::Empty { axis }),
        v if v > u32::from(NEGATIVE_ARTIFACT_THRESHOLD) => {
            Err(ResolutionError::TooLarge { axis, value: v })
        }
        v => Ok(v as u16),
    }
}

/// Pointer position relative to the active window, as the display server
/// reported it. May be negative or larger than any target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawPosition {
    pub x: i32,
    pub y: i32,
}

impl RawPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A clamped pointer sample ready for encoding.
///
/// Always satisfies `x < resolution.width()` and `y < resolution.height()`
/// for the resolution it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerSample {
    pub x: u16,
    pub y: u16,
}

impl PointerSample {
    /// Clamps a raw display-server position into `resolution`.
    pub fn from_raw(raw: RawPosition, resolution: Resolution) -> Self {
        Self {
            x: clamp_axis(raw.x, resolution.width()),
            y: clamp_axis(raw.y, resolution.height()),
        }
    }
}

impl fmt::Display for PointerSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Folds one raw coordinate into `[0, bound-1]`.
///
/// The value is first truncated to `u16`. Anything above
/// [`NEGATIVE_ARTIFACT_THRESHOLD`] is a wrapped negative and maps to `0`;
/// anything from `bound` up to the threshold maps to `bound - 1`.
/// The function is idempotent.
pub fn clamp_axis(raw: i32, bound: u16) -> u16 {
    let truncated = raw as u16;
    if truncated > NEGATIVE_ARTIFACT_THRESHOLD {
        0
    } else if truncated >= bound {
        bound.saturating_sub(1)
    } else {
        truncated
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

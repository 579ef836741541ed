//! Encoding and decoding of the 4-byte pointer frame.
//!
//! Wire format:
//! ```text
//! [x_low:1][x_high:1][y_low:1][y_high:1]
//! ```
//! Each axis is an unsigned 16-bit little-endian value. There is no start
//! marker, checksum, or acknowledgment; the receiver infers frame boundaries
//! from the fixed 4-byte cadence alone.

use thiserror::Error;
use tracing::debug;

use crate::domain::sample::PointerSample;

/// Number of bytes in one frame.
pub const FRAME_LEN: usize = 4;

/// Errors that can occur while decoding frames.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than [`FRAME_LEN`] bytes were supplied.
    #[error("insufficient data: need {} bytes, got {available}", FRAME_LEN)]
    InsufficientData { available: usize },
}

/// One pointer sample laid out for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedFrame([u8; FRAME_LEN]);

impl EncodedFrame {
    /// Splits both axes of `sample` into little-endian byte pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cursorlink_core::{EncodedFrame, PointerSample};
    ///
    /// let frame = EncodedFrame::encode(PointerSample { x: 639, y: 479 });
    /// assert_eq!(frame.as_bytes(), &[0x7F, 0x02, 0xDF, 0x01]);
    /// ```
    pub fn encode(sample: PointerSample) -> Self {
        let [x_low, x_high] = sample.x.to_le_bytes();
        let [y_low, y_high] = sample.y.to_le_bytes();
        Self([x_low, x_high, y_low, y_high])
    }

    /// Reads a sample back from the first [`FRAME_LEN`] bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InsufficientData`] if `bytes` is too short.
    pub fn decode(bytes: &[u8]) -> Result<PointerSample, FrameError> {
        match bytes {
            [x_low, x_high, y_low, y_high, ..] => Ok(PointerSample {
                x: u16::from_le_bytes([*x_low, *x_high]),
                y: u16::from_le_bytes([*y_low, *y_high]),
            }),
            _ => Err(FrameError::InsufficientData {
                available: bytes.len(),
            }),
        }
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

impl From<PointerSample> for EncodedFrame {
    fn from(sample: PointerSample) -> Self {
        Self::encode(sample)
    }
}

impl IntoIterator for EncodedFrame {
    type Item = u8;
    type IntoIter = std::array::IntoIter<u8, FRAME_LEN>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Receiver-side reassembly of frames from a byte stream.
///
/// Bytes are grouped strictly by arrival order. A sender that aborts a frame
/// midway (for example after a failed write) shifts every later frame, which
/// is why [`FrameDecoder::reset`] exists: a receiver that detects a gap in
/// the cadence drops its partial frame and starts counting again.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: [u8; FRAME_LEN],
    filled: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte; returns a sample once four bytes have accumulated.
    pub fn push(&mut self, byte: u8) -> Option<PointerSample> {
        self.pending[self.filled] = byte;
        self.filled += 1;
        if self.filled < FRAME_LEN {
            return None;
        }
        self.filled = 0;
        EncodedFrame::decode(&self.pending).ok()
    }

    /// Feeds a slice and collects every completed sample.
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<PointerSample> {
        bytes.iter().filter_map(|b| self.push(*b)).collect()
    }

    /// Number of bytes buffered toward the next frame.
    pub fn pending(&self) -> usize {
        self.filled
    }

    /// Discards any partial frame.
    pub fn reset(&mut self) {
        if self.filled > 0 {
            debug!(discarded = self.filled, "frame decoder dropped partial frame");
        }
        self.filled = 0;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

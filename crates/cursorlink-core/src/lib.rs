//! # cursorlink-core
//!
//! Shared pure logic for cursorlink: the pointer sample model, the two-tier
//! coordinate clamp, and the 4-byte serial wire format.
//!
//! This crate has zero dependencies on OS APIs, display servers, or serial
//! devices, so everything in it can be tested on any machine.
//!
//! # Overview
//!
//! cursorlink reads the host pointer position and streams it to an external
//! board (typically an FPGA driving a 640x480 display) over a serial line.
//! The pieces that do not touch the OS live here:
//!
//! - **`domain`** – [`RawPosition`] as reported by the display server,
//!   the target [`Resolution`], and the clamped [`PointerSample`].
//!
//! - **`protocol`** – [`EncodedFrame`], the fixed 4-byte little-endian frame
//!   written to the device, and [`FrameDecoder`], the receiver-side view of
//!   the same byte stream.

pub mod domain;
pub mod protocol;

pub use domain::sample::{
    clamp_axis, PointerSample, RawPosition, Resolution, ResolutionError,
    NEGATIVE_ARTIFACT_THRESHOLD,
};
pub use protocol::frame::{EncodedFrame, FrameDecoder, FrameError, FRAME_LEN};

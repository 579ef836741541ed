//! cursorlink library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and
//! the binary entry point in `main.rs` share the same module tree.
//!
//! # What does cursorlink do?
//!
//! It turns the host pointer into a stream of coordinates for an external
//! board on a serial line:
//!
//! 1. Opens the serial device and configures it as a raw 8N1 line.
//! 2. Every poll interval, asks the display server where the pointer is
//!    relative to the focused window.
//! 3. Clamps the position into the board's resolution (640x480 by default).
//! 4. Writes it as a 4-byte little-endian frame, one byte per write call.
//! 5. Stops cleanly on Ctrl+C, closing the serial device.

#[cfg(not(unix))]
compile_error!("cursorlink drives a POSIX serial line and needs a Unix target");

/// Application layer: the streaming use case and its traits.
pub mod application;

/// Infrastructure layer: serial port, display server, and config file adapters.
pub mod infrastructure;

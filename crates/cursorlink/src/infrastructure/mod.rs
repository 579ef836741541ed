//! Infrastructure layer for cursorlink.
//!
//! Contains the OS-facing adapters behind the application layer's traits.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `cursorlink_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`serial`** – Opens and configures the serial device (raw 8N1 via
//!   termios) and implements `FrameSink` with one `write(2)` per byte. Also
//!   holds the dry-run sink and a recording mock.
//!
//! - **`pointer`** – Pointer sampling. On Linux it queries Xlib for the
//!   focused window and the pointer position relative to it. A scripted
//!   mock is provided for tests.
//!
//! - **`storage`** – TOML configuration file loading.

pub mod pointer;
pub mod serial;
pub mod storage;

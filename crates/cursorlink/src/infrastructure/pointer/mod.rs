//! Platform-specific pointer sampling.
//!
//! Each backend implements [`PointerSource`] and is re-exported as
//! `NativePointerSource`, selected at compile time:
//!
//! | Module  | OS                           | API used                                      |
//! |---------|------------------------------|-----------------------------------------------|
//! | `xlib`  | Linux, BSDs, macOS (XQuartz) | Xlib: `_NET_ACTIVE_WINDOW` + `XQueryPointer`  |
//! | (none)  | Android, iOS                 | always reports [`PointerError::Unsupported`]  |
//!
//! A [`mock::ScriptedPointerSource`] is always compiled so the streaming loop
//! can be exercised without a display.

use crate::application::stream_pointer::{PointerError, PointerSource};
use cursorlink_core::RawPosition;

pub mod mock;

// ── X11 implementation ────────────────────────────────────────────────────────

#[cfg(not(any(target_os = "android", target_os = "ios")))]
pub mod xlib;

#[cfg(not(any(target_os = "android", target_os = "ios")))]
pub use xlib::X11PointerSource as NativePointerSource;

// ── Fallback ──────────────────────────────────────────────────────────────────

#[cfg(any(target_os = "android", target_os = "ios"))]
pub use UnsupportedPointerSource as NativePointerSource;

/// Pointer source for platforms without a backend.
#[derive(Debug, Default)]
pub struct UnsupportedPointerSource;

impl UnsupportedPointerSource {
    pub fn new() -> Self {
        Self
    }
}

impl PointerSource for UnsupportedPointerSource {
    fn query_position(&mut self) -> Result<RawPosition, PointerError> {
        Err(PointerError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The default serial device is a macOS name, so macOS must sample
    /// through XQuartz rather than fall back to the unsupported source.
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[test]
    fn test_native_source_is_the_x11_backend_on_desktop_unix() {
        let _source: xlib::X11PointerSource = NativePointerSource::new();
    }

    #[test]
    fn test_unsupported_source_always_errors() {
        let mut source = UnsupportedPointerSource::new();
        assert_eq!(source.query_position(), Err(PointerError::Unsupported));
    }
}

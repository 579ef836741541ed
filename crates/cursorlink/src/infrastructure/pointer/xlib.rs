//! Pointer sampling via the X11 Xlib API.
//!
//! Used on Linux and the BSDs, and on macOS through XQuartz.
//!
//! Every query opens its own display connection, resolves the focused
//! window through the EWMH `_NET_ACTIVE_WINDOW` property on the root window,
//! asks for the pointer position relative to that window, and closes the
//! connection again. Nothing is cached between queries.
//!
//! # Failure handling
//!
//! Each step that can come back empty is checked and mapped to a
//! [`PointerError`]. Xlib's default error handler terminates the process on
//! any protocol error (for instance `BadWindow` when the focused window
//! closes between the property read and the pointer query), so a recording
//! handler is installed once per process; errors it records are reported as
//! [`PointerError::Protocol`].
//!
//! A lost server connection is different: Xlib calls its I/O error handler
//! and then exits the process whatever the handler returns. The handler
//! installed here only logs the reason before that exit.

use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ulong};
use std::ptr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Once;

use tracing::{error, trace};
use x11::xlib;

use crate::application::stream_pointer::{PointerError, PointerSource};
use cursorlink_core::RawPosition;

const ACTIVE_WINDOW_ATOM: &[u8] = b"_NET_ACTIVE_WINDOW\0";

static INSTALL_ERROR_HANDLER: Once = Once::new();

/// Error code of the most recent X protocol error, 0 when none is pending.
static LAST_X_ERROR: AtomicU8 = AtomicU8::new(0);

unsafe extern "C" fn record_x_error(
    _display: *mut xlib::Display,
    event: *mut xlib::XErrorEvent,
) -> c_int {
    // SAFETY: Xlib passes a valid event pointer for the duration of the call.
    if let Some(event) = unsafe { event.as_ref() } {
        LAST_X_ERROR.store(event.error_code, Ordering::SeqCst);
    }
    0
}

unsafe extern "C" fn log_x_io_error(_display: *mut xlib::Display) -> c_int {
    error!("connection to the X server was lost; Xlib will terminate the process");
    0
}

/// X11 implementation of [`PointerSource`].
#[derive(Debug)]
pub struct X11PointerSource;

impl X11PointerSource {
    /// Creates the source and installs the X error handlers.
    pub fn new() -> Self {
        INSTALL_ERROR_HANDLER.call_once(|| {
            // SAFETY: installs process-wide handlers; `record_x_error` only
            // touches an atomic and `log_x_io_error` only logs.
            unsafe {
                xlib::XSetErrorHandler(Some(record_x_error));
                xlib::XSetIOErrorHandler(Some(log_x_io_error));
            }
        });
        Self
    }
}

impl Default for X11PointerSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerSource for X11PointerSource {
    fn query_position(&mut self) -> Result<RawPosition, PointerError> {
        let display = DisplayConnection::open()?;
        let window = display.active_window()?;
        let position = display.query_pointer(window)?;
        trace!(window, x = position.x, y = position.y, "pointer queried");
        Ok(position)
    }
}

/// An open Xlib connection, closed on drop.
struct DisplayConnection(*mut xlib::Display);

impl DisplayConnection {
    fn open() -> Result<Self, PointerError> {
        // SAFETY: a null name selects the display named by $DISPLAY.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            let display = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(PointerError::DisplayUnavailable { display });
        }
        LAST_X_ERROR.store(0, Ordering::SeqCst);
        Ok(Self(display))
    }

    /// Reads the window id stored in `_NET_ACTIVE_WINDOW` on the root window.
    fn active_window(&self) -> Result<xlib::Window, PointerError> {
        // SAFETY: `self.0` is a live connection; the atom name is NUL-terminated.
        let atom = unsafe {
            xlib::XInternAtom(self.0, ACTIVE_WINDOW_ATOM.as_ptr() as *const c_char, xlib::True)
        };
        if atom == 0 {
            return Err(PointerError::ActiveWindowUnsupported);
        }

        let mut actual_type: xlib::Atom = 0;
        let mut actual_format: c_int = 0;
        let mut n_items: c_ulong = 0;
        let mut bytes_after: c_ulong = 0;
        let mut data: *mut c_uchar = ptr::null_mut();

        // SAFETY: all out-pointers reference live locals; the returned buffer
        // is released by `XBuffer`'s Drop.
        let status = unsafe {
            xlib::XGetWindowProperty(
                self.0,
                xlib::XDefaultRootWindow(self.0),
                atom,
                0,
                1,
                xlib::False,
                xlib::AnyPropertyType as xlib::Atom,
                &mut actual_type,
                &mut actual_format,
                &mut n_items,
                &mut bytes_after,
                &mut data,
            )
        };
        let data = XBuffer(data);
        self.take_error("GetProperty")?;

        if status != xlib::Success as c_int || data.0.is_null() || n_items == 0 || actual_format != 32
        {
            return Err(PointerError::NoActiveWindow);
        }

        // SAFETY: format-32 property data is an array of C longs with at
        // least `n_items` (>= 1) elements.
        let window = unsafe { *(data.0 as *const xlib::Window) };
        if window == 0 {
            return Err(PointerError::NoActiveWindow);
        }
        Ok(window)
    }

    /// Pointer position relative to `window`; the button mask is discarded.
    fn query_pointer(&self, window: xlib::Window) -> Result<RawPosition, PointerError> {
        let mut root: xlib::Window = 0;
        let mut child: xlib::Window = 0;
        let mut root_x: c_int = 0;
        let mut root_y: c_int = 0;
        let mut win_x: c_int = 0;
        let mut win_y: c_int = 0;
        let mut mask: c_uint = 0;

        // SAFETY: all out-pointers reference live locals.
        let same_screen = unsafe {
            xlib::XQueryPointer(
                self.0,
                window,
                &mut root,
                &mut child,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            )
        };
        self.take_error("QueryPointer")?;

        if same_screen == xlib::False {
            return Err(PointerError::PointerOffScreen);
        }
        Ok(RawPosition::new(win_x, win_y))
    }

    /// Reports and clears an X error recorded during the last request.
    fn take_error(&self, request: &'static str) -> Result<(), PointerError> {
        match LAST_X_ERROR.swap(0, Ordering::SeqCst) {
            0 => Ok(()),
            code => Err(PointerError::Protocol { request, code }),
        }
    }
}

impl Drop for DisplayConnection {
    fn drop(&mut self) {
        // SAFETY: `self.0` came from XOpenDisplay and is not used afterwards.
        unsafe { xlib::XCloseDisplay(self.0) };
    }
}

/// A buffer allocated by Xlib, released with `XFree`.
struct XBuffer(*mut c_uchar);

impl Drop for XBuffer {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // SAFETY: the pointer was returned by XGetWindowProperty.
            unsafe { xlib::XFree(self.0.cast()) };
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

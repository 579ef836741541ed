//! Application layer use cases for cursorlink.
//!
//! - **`stream_pointer`** – The main loop: sample the pointer through a
//!   [`stream_pointer::PointerSource`], encode the sample into a frame, and
//!   push it byte by byte into a [`stream_pointer::FrameSink`]. Both seams are
//!   traits so the loop can run against the X11 display and a real serial
//!   port in production, or against scripted fakes in tests.

pub mod stream_pointer;

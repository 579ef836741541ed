//! Serial wire format: the fixed 4-byte pointer frame.

pub mod frame;

pub use frame::{EncodedFrame, FrameDecoder, FrameError, FRAME_LEN};

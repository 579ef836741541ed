//! Mock serial sink for tests.
//!
//! Records every byte that reaches it and can be told to fail specific write
//! attempts, so the frame-abort behaviour of the streaming loop can be
//! observed without a serial device.
//!
//! # Usage in tests
//!
//! ```ignore
//! let mut sink = MockSerialSink::new();
//! sink.fail_attempts.insert(1); // second byte of the first frame
//! let mut streamer = PointerStreamer::new(source, sink, settings);
//! streamer.tick();
//! let (_, sink) = streamer.into_parts();
//! assert_eq!(sink.attempts, 2);
//! ```

use std::collections::HashSet;

use crate::application::stream_pointer::{FrameSink, SinkError};

/// A sink that records all accepted bytes in order.
#[derive(Debug, Default)]
pub struct MockSerialSink {
    /// Bytes accepted, in write order.
    pub written: Vec<u8>,
    /// Total `write_byte` calls, successful or not.
    pub attempts: usize,
    /// Zero-based attempt indices that return a short write.
    pub fail_attempts: HashSet<usize>,
}

impl MockSerialSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose listed attempts fail.
    pub fn failing_at(attempts: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_attempts: attempts.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl FrameSink for MockSerialSink {
    /// Records the byte, or reports a zero-length write for a listed attempt.
    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_attempts.contains(&attempt) {
            return Err(SinkError::ShortWrite { written: 0 });
        }
        self.written.push(byte);
        Ok(())
    }
}

//! Sink used by `--dry-run`: accepts every byte without a device attached.

use tracing::trace;

use crate::application::stream_pointer::{FrameSink, SinkError};

/// Counts bytes instead of writing them anywhere.
#[derive(Debug, Default)]
pub struct DryRunSink {
    bytes: u64,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes accepted so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl FrameSink for DryRunSink {
    fn write_byte(&mut self, byte: u8) -> Result<(), SinkError> {
        self.bytes += 1;
        trace!("dry-run byte {byte:#04x}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_sink_accepts_and_counts_bytes() {
        let mut sink = DryRunSink::new();
        for byte in [0x7F, 0x02, 0xDF, 0x01] {
            sink.write_byte(byte).expect("dry run never fails");
        }
        assert_eq!(sink.bytes(), 4);
    }
}

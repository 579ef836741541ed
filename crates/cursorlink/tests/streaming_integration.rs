//! Integration tests for the pointer streaming loop.
//!
//! # Purpose
//!
//! These tests drive `PointerStreamer` through its public API with the
//! crate's scripted pointer source and recording serial sink, and check the
//! exact bytes that would reach the board:
//!
//! - Clamping and little-endian encoding of real positions.
//! - Byte-at-a-time writes and abandoning the rest of a frame on failure.
//! - The missing-sample policies.
//! - `run` honouring both `max_polls` and the shutdown flag.
//!
//! The receiving side is modelled with `FrameDecoder`, which reads the wire
//! by fixed 4-byte cadence just like the board does.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use mockall::{mock, predicate::eq, Sequence};

use cursorlink::application::stream_pointer::{
    FrameSink, MissingSamplePolicy, PointerError, PointerStreamer, SinkError, StreamSettings,
    TickReport,
};
use cursorlink::infrastructure::pointer::mock::ScriptedPointerSource;
use cursorlink::infrastructure::serial::mock::MockSerialSink;
use cursorlink_core::{FrameDecoder, PointerSample, RawPosition, Resolution};

mock! {
    pub Sink {}
    impl FrameSink for Sink {
        fn write_byte(&mut self, byte: u8) -> Result<(), SinkError>;
    }
}

fn settings(on_missing: MissingSamplePolicy) -> StreamSettings {
    StreamSettings {
        interval: Duration::from_millis(1),
        on_missing,
        ..StreamSettings::default()
    }
}

// ── Encoding scenarios ────────────────────────────────────────────────────────

/// A position beyond the board's right and bottom edges lands on the last
/// pixel and goes out as `7F 02 DF 01`.
#[test]
fn test_oversized_position_is_clamped_and_sent_little_endian() {
    // Arrange
    let source = ScriptedPointerSource::positions([(700, 500)]);
    let mut streamer =
        PointerStreamer::new(source, MockSerialSink::new(), settings(MissingSamplePolicy::Skip));

    // Act
    let report = streamer.tick();

    // Assert
    assert!(matches!(report, TickReport::Sent { held: false, .. }));
    assert_eq!(streamer.sink().written, vec![0x7F, 0x02, 0xDF, 0x01]);
}

/// Negative window-relative coordinates wrap to large unsigned values and
/// are treated as "left of / above the window": they become zero.
#[test]
fn test_negative_position_is_sent_as_origin() {
    let source = ScriptedPointerSource::positions([(-1, -1)]);
    let mut streamer =
        PointerStreamer::new(source, MockSerialSink::new(), settings(MissingSamplePolicy::Skip));

    streamer.tick();

    assert_eq!(streamer.sink().written, vec![0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn test_bytes_are_written_individually_in_wire_order() {
    // Arrange: 300 = 0x012C, 200 = 0x00C8
    let mut sink = MockSink::new();
    let mut seq = Sequence::new();
    for byte in [0x2C, 0x01, 0xC8, 0x00] {
        sink.expect_write_byte()
            .with(eq(byte))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
    }
    let source = ScriptedPointerSource::positions([(300, 200)]);
    let mut streamer = PointerStreamer::new(source, sink, settings(MissingSamplePolicy::Skip));

    // Act
    let report = streamer.tick();

    // Assert: expectations are verified when the mock is dropped
    assert!(matches!(
        report,
        TickReport::Sent {
            sample: PointerSample { x: 300, y: 200 },
            ..
        }
    ));
}

#[test]
fn test_custom_resolution_bounds_the_samples() {
    let source = ScriptedPointerSource::positions([(1000, 1000)]);
    let settings = StreamSettings {
        resolution: Resolution::new(320, 240).expect("valid resolution"),
        ..settings(MissingSamplePolicy::Skip)
    };
    let mut streamer = PointerStreamer::new(source, MockSerialSink::new(), settings);

    streamer.tick();

    let mut decoder = FrameDecoder::new();
    let samples = decoder.extend(&streamer.sink().written);
    assert_eq!(samples, vec![PointerSample { x: 319, y: 239 }]);
}

// ── Write failures ────────────────────────────────────────────────────────────

/// A failure on the second byte leaves exactly one byte on the wire; bytes
/// three and four are never attempted.
#[test]
fn test_failure_on_second_byte_abandons_rest_of_frame() {
    // Arrange
    let source = ScriptedPointerSource::positions([(700, 500)]);
    let sink = MockSerialSink::failing_at([1]);
    let mut streamer = PointerStreamer::new(source, sink, settings(MissingSamplePolicy::Skip));

    // Act
    let report = streamer.tick();

    // Assert
    match report {
        TickReport::Partial { written, error, .. } => {
            assert_eq!(written, 1);
            assert!(matches!(error, SinkError::ShortWrite { written: 0 }));
        }
        other => panic!("expected a partial frame, got {other:?}"),
    }
    assert_eq!(streamer.sink().written, vec![0x7F]);
    assert_eq!(streamer.sink().attempts, 2);
}

#[test]
fn test_failed_write_is_not_retried_by_mock_expectations() {
    // Arrange: first byte fails, no further writes may happen this frame
    let mut sink = MockSink::new();
    sink.expect_write_byte()
        .times(1)
        .returning(|_| Err(SinkError::ShortWrite { written: 0 }));
    let source = ScriptedPointerSource::positions([(5, 5)]);
    let mut streamer = PointerStreamer::new(source, sink, settings(MissingSamplePolicy::Skip));

    // Act
    let report = streamer.tick();

    // Assert
    assert!(matches!(report, TickReport::Partial { written: 0, .. }));
    assert_eq!(streamer.stats().partial, 1);
}

/// After an aborted frame the receiver is misaligned; the loop does not try
/// to fix that, it just keeps sending whole frames.
#[test]
fn test_aborted_frame_is_followed_by_complete_frames() {
    let source = ScriptedPointerSource::positions([(700, 500), (1, 2)]);
    let sink = MockSerialSink::failing_at([2]);
    let mut streamer = PointerStreamer::new(source, sink, settings(MissingSamplePolicy::Skip));

    streamer.tick();
    streamer.tick();

    assert_eq!(
        streamer.sink().written,
        vec![0x7F, 0x02, 0x01, 0x00, 0x02, 0x00]
    );
    let stats = streamer.stats();
    assert_eq!((stats.sent, stats.partial), (1, 1));
}

// ── Missing samples ───────────────────────────────────────────────────────────

#[test]
fn test_skip_policy_sends_nothing_while_no_window_is_focused() {
    let source = ScriptedPointerSource::new([
        Ok(RawPosition::new(10, 10)),
        Err(PointerError::NoActiveWindow),
        Ok(RawPosition::new(20, 20)),
    ]);
    let mut streamer =
        PointerStreamer::new(source, MockSerialSink::new(), settings(MissingSamplePolicy::Skip));

    for _ in 0..3 {
        streamer.tick();
    }

    let samples = FrameDecoder::new().extend(&streamer.sink().written);
    assert_eq!(
        samples,
        vec![PointerSample { x: 10, y: 10 }, PointerSample { x: 20, y: 20 }]
    );
    assert_eq!(streamer.stats().skipped, 1);
}

#[test]
fn test_hold_last_policy_repeats_last_good_sample() {
    let source = ScriptedPointerSource::new([
        Ok(RawPosition::new(10, 10)),
        Err(PointerError::Protocol {
            request: "XQueryPointer",
            code: 3,
        }),
    ]);
    let mut streamer = PointerStreamer::new(
        source,
        MockSerialSink::new(),
        settings(MissingSamplePolicy::HoldLast),
    );

    streamer.tick();
    let report = streamer.tick();

    assert!(matches!(report, TickReport::Sent { held: true, .. }));
    let samples = FrameDecoder::new().extend(&streamer.sink().written);
    assert_eq!(samples, vec![PointerSample { x: 10, y: 10 }; 2]);
}

// ── Run loop ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_sends_one_frame_per_poll() {
    // Arrange
    let source = ScriptedPointerSource::positions([(0, 0), (639, 479), (640, 480), (1, 1)]);
    let settings = StreamSettings {
        max_polls: Some(3),
        ..settings(MissingSamplePolicy::Skip)
    };
    let mut streamer = PointerStreamer::new(source, MockSerialSink::new(), settings);
    let running = AtomicBool::new(true);

    // Act
    let stats = streamer.run(&running).await;

    // Assert
    assert_eq!(stats.sent, 3);
    let (source, sink) = streamer.into_parts();
    assert_eq!(source.queries, 3);
    assert_eq!(
        FrameDecoder::new().extend(&sink.written),
        vec![
            PointerSample { x: 0, y: 0 },
            PointerSample { x: 639, y: 479 },
            PointerSample { x: 639, y: 479 },
        ]
    );
}

#[tokio::test]
async fn test_run_counts_skips_when_source_is_exhausted() {
    let source = ScriptedPointerSource::positions([(4, 4)]);
    let settings = StreamSettings {
        max_polls: Some(4),
        ..settings(MissingSamplePolicy::Skip)
    };
    let mut streamer = PointerStreamer::new(source, MockSerialSink::new(), settings);
    let running = AtomicBool::new(true);

    let stats = streamer.run(&running).await;

    assert_eq!((stats.sent, stats.skipped), (1, 3));
    assert_eq!(streamer.sink().written.len(), 4);
}

//! Common test utilities for protocol integration tests.
//!
//! Provides the two record shapes observed on real devices, in both line
//! and wire form, plus helpers that drive a parser and decoder the way a
//! camera connection does.
#![allow(dead_code)]

use camlisten_protocol::{CameraEvent, EventFrame, PayloadDecoder, RawRecord, StreamParser};

/// Camera name used for every decoded event.
pub const CAMERA: &str = "driveway";

/// Single-line record as the line source delivers it (already trimmed).
pub const SINGLE_LINE_RECORD: [&str; 5] = [
    "--myboundary",
    "Content-Type: text/plain",
    "Content-Length: 37",
    "",
    "Code=VideoMotionInfo;action=State;index=0",
];

/// JSON record as the line source delivers it, including trailing padding.
pub const JSON_RECORD: [&str; 9] = [
    "--myboundary",
    "Content-Type: text/plain",
    "Content-Length: 164",
    "",
    "Code=SmartMotionVehicle;action=Start;index=0;data={",
    "\"RegionName\" : [ \"Area1\" ],",
    "\"object\" : [ { \"Rect\" : [4576,5000,4984,5256], \"VehicleID\" : 13421 } ]",
    "}",
    "",
];

/// Build the single-line record in wire form.
pub fn single_line_frame() -> EventFrame {
    EventFrame::single("Code=VideoMotionInfo;action=State;index=0").with_content_length(37)
}

/// Build the JSON record in wire form, with NUL padding after the body.
pub fn json_frame() -> EventFrame {
    EventFrame::json(
        "Code=SmartMotionVehicle;action=Start;index=0",
        [
            "   \"RegionName\" : [ \"Area1\" ],",
            "   \"object\" : [ { \"Rect\" : [4576,5000,4984,5256], \"VehicleID\" : 13421 } ]",
        ],
    )
    .with_content_length(164)
    .with_trailer(["\0\0\0\0", ""])
}

/// Feed lines into a parser and collect every record it completes.
pub fn feed_lines(parser: &mut StreamParser, lines: &[&str]) -> Vec<RawRecord> {
    lines.iter().filter_map(|line| parser.feed_line(line)).collect()
}

/// Parse and decode lines, skipping records that fail to decode.
pub fn decode_lines(parser: &mut StreamParser, lines: &[&str]) -> Vec<CameraEvent> {
    feed_lines(parser, lines)
        .iter()
        .filter_map(|record| PayloadDecoder::decode(CAMERA, record.as_str()).ok())
        .collect()
}

/// Assert an event carries the expected code, action and index.
pub fn assert_event(event: &CameraEvent, code: &str, action: &str, index: &str) {
    assert_eq!(event.camera(), CAMERA, "camera name");
    assert_eq!(event.code(), code, "event code");
    assert_eq!(event.action(), action, "event action");
    assert_eq!(event.index(), index, "event index");
}

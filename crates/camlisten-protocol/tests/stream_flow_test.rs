//! Integration tests for the record flow from lines to events.
//!
//! These tests drive the parser and decoder with the record shapes observed
//! on real devices and with the framing faults a noisy feed produces.

mod common;

use camlisten_core::{Error, constants::MAX_JSON_LINES};
use camlisten_protocol::{ParserState, PayloadDecoder, StreamParser};
use common::{CAMERA, JSON_RECORD, SINGLE_LINE_RECORD, assert_event, decode_lines, feed_lines};

// ============================================================================
// Observed Record Shapes
// ============================================================================

#[test]
fn test_single_line_record_produces_one_event() {
    let mut parser = StreamParser::new();
    let events = decode_lines(&mut parser, &SINGLE_LINE_RECORD);

    assert_eq!(events.len(), 1);
    assert_event(&events[0], "VideoMotionInfo", "State", "0");
    assert!(events[0].data().is_none());
}

#[test]
fn test_json_record_produces_one_event() {
    let mut parser = StreamParser::new();
    let events = decode_lines(&mut parser, &JSON_RECORD);

    assert_eq!(events.len(), 1);
    assert_event(&events[0], "SmartMotionVehicle", "Start", "0");

    let data = events[0].data().unwrap();
    assert_eq!(
        data,
        "{\n\
         \"RegionName\" : [ \"Area1\" ],\n\
         \"object\" : [ { \"Rect\" : [4576,5000,4984,5256], \"VehicleID\" : 13421 } ]\n\
         }"
    );
    assert_eq!(parser.state(), ParserState::Discard);
}

#[test]
fn test_replay_after_reset_yields_same_events() {
    let mut parser = StreamParser::new();
    let mut lines: Vec<&str> = SINGLE_LINE_RECORD.to_vec();
    lines.extend_from_slice(&JSON_RECORD);

    let first = decode_lines(&mut parser, &lines);
    parser.clear();
    let second = decode_lines(&mut parser, &lines);

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.raw(), b.raw());
        assert_eq!(a.code(), b.code());
        assert_eq!(a.data(), b.data());
    }
    assert_eq!(first[0].code(), "VideoMotionInfo");
    assert_eq!(first[1].code(), "SmartMotionVehicle");
}

// ============================================================================
// Framing Faults
// ============================================================================

#[test]
fn test_boundary_inside_json_body_aborts_record() {
    let mut parser = StreamParser::new();
    let lines = [
        "--myboundary",
        "",
        "Code=SmartMotionVehicle;action=Start;index=0;data={",
        "--myboundary",
        "Content-Type: text/plain",
        "",
        "Code=VideoMotionInfo;action=State;index=0",
    ];

    let events = decode_lines(&mut parser, &lines);
    assert_eq!(events.len(), 1);
    assert_event(&events[0], "VideoMotionInfo", "State", "0");
}

#[test]
fn test_unclosed_json_body_is_abandoned() {
    let mut parser = StreamParser::new();
    let mut lines = vec!["--myboundary", "", "Code=A;action=Start;index=0;data={"];
    lines.extend(std::iter::repeat_n("\"x\" : 1,", MAX_JSON_LINES + 1));
    lines.push("}");

    let records = feed_lines(&mut parser, &lines);
    assert!(records.is_empty());
    assert_eq!(parser.state(), ParserState::Discard);
    assert_eq!(parser.buffered_len(), 0);

    // Framing recovers at the next boundary
    let events = decode_lines(&mut parser, &SINGLE_LINE_RECORD);
    assert_eq!(events.len(), 1);
}

#[test]
fn test_attach_mid_stream() {
    let mut parser = StreamParser::new();
    let mut lines = vec![
        "\"object\" : [ { \"VehicleID\" : 13421 } ]",
        "}",
        "",
        "Code=Fake;action=Start;index=9",
    ];
    lines.extend_from_slice(&SINGLE_LINE_RECORD);

    let events = decode_lines(&mut parser, &lines);
    assert_eq!(events.len(), 1);
    assert_event(&events[0], "VideoMotionInfo", "State", "0");
}

#[test]
fn test_content_after_json_close_is_absorbed() {
    let mut parser = StreamParser::new();
    let mut lines: Vec<&str> = JSON_RECORD.to_vec();
    lines.push("Code=Orphan;action=Start;index=0");

    let events = decode_lines(&mut parser, &lines);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code(), "SmartMotionVehicle");
}

// ============================================================================
// Decode Failures
// ============================================================================

#[test]
fn test_decode_failure_leaves_framing_intact() {
    let mut parser = StreamParser::new();
    let lines = ["--myboundary", "", "Code=Foo;action=Bar"];

    let records = feed_lines(&mut parser, &lines);
    assert_eq!(records.len(), 1);
    assert_eq!(parser.state(), ParserState::Idle);

    let err = PayloadDecoder::decode(CAMERA, records[0].as_str()).unwrap_err();
    assert!(matches!(err, Error::MissingField { position: 2, .. }));

    // The next record decodes normally
    let events = decode_lines(&mut parser, &SINGLE_LINE_RECORD);
    assert_eq!(events.len(), 1);
}

#[test]
fn test_blank_first_content_line_fails_decode() {
    let mut parser = StreamParser::new();
    let records = feed_lines(&mut parser, &["--myboundary", "", ""]);

    assert_eq!(records.len(), 1);
    assert!(PayloadDecoder::decode(CAMERA, records[0].as_str()).is_err());
}

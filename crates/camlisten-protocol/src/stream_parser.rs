//! Line-level stream parser for the camera event feed.
//!
//! This module provides the per-connection state machine that turns a
//! sequence of trimmed text lines into complete record texts. The feed is
//! loosely framed: records start with a boundary line, carry a header section
//! that ends with a blank line, and then either a single payload line or a
//! payload line announcing a JSON body that runs until a line holding only
//! `}`.
//!
//! # Protocol Framing
//!
//! ```text
//! --myboundary                                      <- boundary
//! Content-Type: text/plain                          <- header (ignored)
//! Content-Length: 164                               <- header (ignored)
//!                                                   <- end of header
//! Code=SmartMotionVehicle;action=Start;index=0;data={
//!    "RegionName" : [ "Area1" ],
//! }                                                 <- end of record
//!                                                   <- padding (ignored)
//! ```
//!
//! The declared `Content-Length` is unreliable, so the only trusted
//! resynchronisation point is the boundary line. The parser recovers at the
//! next boundary from any state.
//!
//! # Usage
//!
//! ```
//! use camlisten_protocol::StreamParser;
//!
//! let mut parser = StreamParser::new();
//!
//! assert!(parser.feed_line("--myboundary").is_none());
//! assert!(parser.feed_line("Content-Type: text/plain").is_none());
//! assert!(parser.feed_line("").is_none());
//!
//! let record = parser.feed_line("Code=VideoMotionInfo;action=State;index=0").unwrap();
//! assert_eq!(record.as_str(), "Code=VideoMotionInfo;action=State;index=0");
//! ```

use camlisten_core::constants::{
    BOUNDARY_MARKER, JSON_CLOSING_LINE, JSON_PAYLOAD_SUFFIX, MAX_JSON_LINES,
    RECORD_LINE_SEPARATOR,
};
use std::fmt;
use tracing::{debug, trace};

/// Initial capacity of the record accumulation buffer.
///
/// Large enough for a typical JSON detail body without reallocation.
const INITIAL_BUFFER_CAPACITY: usize = 1024; // 1 KB

/// State machine states for parsing the camera event feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No record in progress; waiting for a boundary line.
    ///
    /// Any other line means the listener attached mid-stream or framing was
    /// lost, and the parser drops into [`ParserState::Discard`].
    Idle,

    /// Inside the header section; waiting for the blank line that ends it.
    ///
    /// Header lines carry no interpreted fields.
    Header,

    /// Expecting the first payload line, which decides between a single-line
    /// record and a JSON body.
    StartContent,

    /// Accumulating lines of an embedded JSON body until a closing `}` line.
    JsonContent,

    /// Ignoring every line until the next boundary.
    Discard,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Idle => "idle",
            ParserState::Header => "header",
            ParserState::StartContent => "start-content",
            ParserState::JsonContent => "json-content",
            ParserState::Discard => "discard",
        };
        f.write_str(name)
    }
}

/// Classification of a single trimmed line.
///
/// A line is exactly one kind; a boundary is never blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The literal boundary marker.
    Boundary,
    /// An empty line.
    Blank,
    /// Anything else.
    Other,
}

impl LineKind {
    /// Classify a line that has already been trimmed.
    ///
    /// # Example
    ///
    /// ```
    /// use camlisten_protocol::LineKind;
    ///
    /// assert_eq!(LineKind::of("--myboundary"), LineKind::Boundary);
    /// assert_eq!(LineKind::of(""), LineKind::Blank);
    /// assert_eq!(LineKind::of("Content-Length: 37"), LineKind::Other);
    /// ```
    pub fn of(line: &str) -> Self {
        if line == BOUNDARY_MARKER {
            LineKind::Boundary
        } else if line.is_empty() {
            LineKind::Blank
        } else {
            LineKind::Other
        }
    }
}

/// Complete record text, ready for the payload decoder.
///
/// Lines of a multi-line record are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord(String);

impl RawRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Record text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the record and return its text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the record carries a JSON body.
    pub fn has_json_body(&self) -> bool {
        self.0.ends_with(JSON_CLOSING_LINE) && self.0.contains(JSON_PAYLOAD_SUFFIX)
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RawRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stateful line parser for the camera event feed.
///
/// One parser belongs to one camera connection and is driven from a single
/// sequence of lines, so it needs no internal locking.
///
/// # State Machine
///
/// ```text
///            boundary             blank              single line
/// ┌──────┐ ───────────> ┌──────┐ ───────> ┌──────────────┐ ──────────> Idle (record ready)
/// │ Idle │              │Header│          │ StartContent │
/// └──────┘              └──────┘          └──────────────┘
///    │ other/blank        ^  │ other            │ ends with ";data={"
///    v                    │  └─(stay)           v
/// ┌───────┐   boundary    │               ┌─────────────┐  "}"
/// │Discard│ ──────────────┘               │ JsonContent │ ─────> Discard (record ready)
/// └───────┘ <──────────────────────────── └─────────────┘
///             countdown exhausted (record abandoned)
///
/// A boundary from StartContent or JsonContent abandons the record in
/// progress and re-enters Header.
/// ```
///
/// After a JSON body the parser goes to Discard rather than Idle, since the
/// device pads the record with blank or NUL lines that must be skipped until
/// the next boundary.
///
/// # Example
///
/// ```
/// use camlisten_protocol::{ParserState, StreamParser};
///
/// let mut parser = StreamParser::new();
/// let lines = [
///     "--myboundary",
///     "Content-Type: text/plain",
///     "Content-Length: 164",
///     "",
///     "Code=SmartMotionVehicle;action=Start;index=0;data={",
///     "\"RegionName\" : [ \"Area1\" ],",
///     "}",
/// ];
///
/// let records: Vec<_> = lines.iter().filter_map(|l| parser.feed_line(l)).collect();
/// assert_eq!(records.len(), 1);
/// assert_eq!(parser.state(), ParserState::Discard);
/// ```
#[derive(Debug)]
pub struct StreamParser {
    /// Current state of the parser state machine.
    state: ParserState,

    /// Text of the record being assembled.
    buffer: String,

    /// Non-closing lines still accepted in the current JSON body.
    json_lines_remaining: usize,
}

impl StreamParser {
    /// Create a new parser in [`ParserState::Idle`].
    ///
    /// # Example
    ///
    /// ```
    /// use camlisten_protocol::{ParserState, StreamParser};
    ///
    /// let parser = StreamParser::new();
    /// assert_eq!(parser.state(), ParserState::Idle);
    /// ```
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            buffer: String::with_capacity(INITIAL_BUFFER_CAPACITY),
            json_lines_remaining: 0,
        }
    }

    /// Feed one trimmed line into the state machine.
    ///
    /// Returns the record text when this line completes a record. Framing
    /// anomalies are never reported: the parser resynchronises at the next
    /// boundary and returns `None`.
    ///
    /// # Arguments
    ///
    /// * `line` - One line of the feed with surrounding whitespace removed
    ///
    /// # Example
    ///
    /// ```
    /// use camlisten_protocol::{ParserState, StreamParser};
    ///
    /// let mut parser = StreamParser::new();
    ///
    /// // Content before any boundary is dropped
    /// assert!(parser.feed_line("index=0").is_none());
    /// assert_eq!(parser.state(), ParserState::Discard);
    ///
    /// parser.feed_line("--myboundary");
    /// assert_eq!(parser.state(), ParserState::Header);
    /// ```
    pub fn feed_line(&mut self, line: &str) -> Option<RawRecord> {
        let kind = LineKind::of(line);
        trace!(state = %self.state, ?kind, "Parser line");

        match self.state {
            ParserState::Idle => {
                self.handle_idle(kind);
                None
            }
            ParserState::Header => {
                self.handle_header(kind);
                None
            }
            ParserState::StartContent => self.handle_start_content(line, kind),
            ParserState::JsonContent => self.handle_json_content(line, kind),
            ParserState::Discard => {
                self.handle_discard(kind);
                None
            }
        }
    }

    /// Returns current parser state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of bytes accumulated for the record in progress.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Non-closing lines still accepted before the current JSON body is
    /// abandoned. Zero outside [`ParserState::JsonContent`].
    pub fn json_lines_remaining(&self) -> usize {
        if self.state == ParserState::JsonContent {
            self.json_lines_remaining
        } else {
            0
        }
    }

    /// Drop any record in progress and wait for the next boundary.
    ///
    /// Used by the line source when it had to throw input away (for example
    /// an overlong line), since the framing can no longer be trusted.
    pub fn resynchronize(&mut self) {
        if !self.buffer.is_empty() {
            debug!(
                state = %self.state,
                buffered = self.buffer.len(),
                "Dropping partial record"
            );
        }
        self.buffer.clear();
        self.state = ParserState::Discard;
    }

    /// Clear the buffer and reset state machine to [`ParserState::Idle`].
    ///
    /// # Example
    ///
    /// ```
    /// use camlisten_protocol::{ParserState, StreamParser};
    ///
    /// let mut parser = StreamParser::new();
    /// parser.feed_line("--myboundary");
    /// parser.clear();
    ///
    /// assert_eq!(parser.state(), ParserState::Idle);
    /// assert_eq!(parser.buffered_len(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.json_lines_remaining = 0;
        self.state = ParserState::Idle;
    }

    /// Handle Idle state: only a boundary starts a record.
    fn handle_idle(&mut self, kind: LineKind) {
        if kind == LineKind::Boundary {
            self.state = ParserState::Header;
        } else {
            debug!("Content outside a record, discarding until next boundary");
            self.state = ParserState::Discard;
        }
    }

    /// Handle Header state: a blank line ends the header section.
    fn handle_header(&mut self, kind: LineKind) {
        if kind == LineKind::Blank {
            self.state = ParserState::StartContent;
        }
    }

    /// Handle StartContent state: the first payload line decides the record shape.
    fn handle_start_content(&mut self, line: &str, kind: LineKind) -> Option<RawRecord> {
        if kind == LineKind::Boundary {
            self.abandon_record(ParserState::Header);
            return None;
        }

        self.append_line(line);

        if line.ends_with(JSON_PAYLOAD_SUFFIX) {
            self.json_lines_remaining = MAX_JSON_LINES;
            self.state = ParserState::JsonContent;
            None
        } else {
            self.state = ParserState::Idle;
            Some(self.take_record())
        }
    }

    /// Handle JsonContent state: accumulate until the closing brace or the
    /// line budget runs out.
    fn handle_json_content(&mut self, line: &str, kind: LineKind) -> Option<RawRecord> {
        if kind == LineKind::Boundary {
            self.abandon_record(ParserState::Header);
            return None;
        }

        self.append_line(line);

        if line == JSON_CLOSING_LINE {
            // Trailing padding follows the closing brace
            self.state = ParserState::Discard;
            return Some(self.take_record());
        }

        self.json_lines_remaining = self.json_lines_remaining.saturating_sub(1);
        if self.json_lines_remaining == 0 {
            debug!(max_lines = MAX_JSON_LINES, "JSON body not closed in time");
            self.abandon_record(ParserState::Discard);
        }
        None
    }

    /// Handle Discard state: wait for the next boundary.
    fn handle_discard(&mut self, kind: LineKind) {
        if kind == LineKind::Boundary {
            self.state = ParserState::Header;
        }
    }

    /// Append a payload line, separating it from the previous one.
    fn append_line(&mut self, line: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push(RECORD_LINE_SEPARATOR);
        }
        self.buffer.push_str(line);
    }

    /// Hand out the accumulated text, keeping the buffer's capacity.
    fn take_record(&mut self) -> RawRecord {
        let record = RawRecord::new(self.buffer.as_str());
        self.buffer.clear();
        record
    }

    /// Drop the record in progress without producing anything.
    fn abandon_record(&mut self, next: ParserState) {
        debug!(
            state = %self.state,
            next = %next,
            buffered = self.buffer.len(),
            "Abandoning partial record"
        );
        self.buffer.clear();
        self.state = next;
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

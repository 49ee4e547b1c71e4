use bytes::{BufMut, Bytes, BytesMut};
use camlisten_core::constants::{
    BOUNDARY_MARKER, JSON_CLOSING_LINE, JSON_PAYLOAD_SUFFIX, RECORD_CONTENT_TYPE,
};
use std::fmt;

/// Line terminator used by devices on the wire.
const WIRE_LINE_END: &str = "\r\n";

/// One device record in wire form.
///
/// `EventFrame` is the writing side of the feed: it renders a record the way
/// a camera sends it, so simulated devices and benchmarks can produce
/// realistic input for the reading side.
///
/// # Wire Format
///
/// ```text
/// --myboundary\r\n
/// Content-Type: text/plain\r\n
/// Content-Length: <n>\r\n
/// \r\n
/// <payload line>\r\n
/// [<payload line>\r\n ...]
/// <trailer line>\r\n          (blank by default)
/// ```
///
/// `Content-Length` defaults to the byte length of the payload lines joined
/// with `\r\n`. Real devices are not consistent about it, and readers never
/// rely on it, so it can be overridden.
///
/// # Example
///
/// ```
/// use camlisten_protocol::EventFrame;
///
/// let frame = EventFrame::single("Code=VideoMotionInfo;action=State;index=0");
/// let wire = frame.to_string();
///
/// assert!(wire.starts_with("--myboundary\r\nContent-Type: text/plain\r\n"));
/// assert!(wire.contains("Content-Length: 41\r\n\r\nCode=VideoMotionInfo"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFrame {
    /// Payload lines in order.
    lines: Vec<String>,

    /// Declared `Content-Length`, if overridden.
    content_length: Option<usize>,

    /// Lines sent after the payload.
    trailer: Vec<String>,
}

impl EventFrame {
    /// Frame carrying a single payload line.
    pub fn single(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            content_length: None,
            trailer: vec![String::new()],
        }
    }

    /// Frame carrying a JSON detail body.
    ///
    /// `prefix` is the field part of the first line (for example
    /// `Code=SmartMotionVehicle;action=Start;index=0`); `;data={` is appended
    /// to it and a closing `}` line follows `body`.
    ///
    /// # Example
    ///
    /// ```
    /// use camlisten_protocol::EventFrame;
    ///
    /// let frame = EventFrame::json(
    ///     "Code=SmartMotionVehicle;action=Start;index=0",
    ///     ["   \"RegionName\" : [ \"Area1\" ],"],
    /// );
    ///
    /// assert_eq!(frame.lines().len(), 3);
    /// assert_eq!(frame.lines()[0], "Code=SmartMotionVehicle;action=Start;index=0;data={");
    /// assert_eq!(frame.lines()[2], "}");
    /// ```
    pub fn json<I, S>(prefix: &str, body: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines = vec![format!("{prefix}{JSON_PAYLOAD_SUFFIX}")];
        lines.extend(body.into_iter().map(Into::into));
        lines.push(JSON_CLOSING_LINE.to_string());

        Self {
            lines,
            content_length: None,
            trailer: vec![String::new()],
        }
    }

    /// Frame with arbitrary payload lines, sent as given.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            content_length: None,
            trailer: vec![String::new()],
        }
    }

    /// Override the declared `Content-Length`.
    #[must_use]
    pub fn with_content_length(mut self, length: usize) -> Self {
        self.content_length = Some(length);
        self
    }

    /// Replace the lines sent after the payload, e.g. NUL padding.
    #[must_use]
    pub fn with_trailer<I, S>(mut self, trailer: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trailer = trailer.into_iter().map(Into::into).collect();
        self
    }

    /// Payload lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines sent after the payload.
    pub fn trailer(&self) -> &[String] {
        &self.trailer
    }

    /// Every line of the frame body, payload then trailer.
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .chain(self.trailer.iter())
            .map(String::as_str)
    }

    /// Value written in the `Content-Length` header.
    pub fn declared_length(&self) -> usize {
        self.content_length.unwrap_or_else(|| {
            let text: usize = self.lines.iter().map(String::len).sum();
            text + WIRE_LINE_END.len() * self.lines.len().saturating_sub(1)
        })
    }

    /// The record text a reader assembles from this frame.
    ///
    /// Lines are trimmed and joined with `\n`, matching what the stream
    /// parser produces.
    pub fn record_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Append the wire form to `dst`.
    pub fn write_to(&self, dst: &mut BytesMut) {
        let header = format!(
            "{BOUNDARY_MARKER}{WIRE_LINE_END}\
             Content-Type: {RECORD_CONTENT_TYPE}{WIRE_LINE_END}\
             Content-Length: {}{WIRE_LINE_END}{WIRE_LINE_END}",
            self.declared_length()
        );
        dst.reserve(header.len() + self.declared_length() + 16);
        dst.put_slice(header.as_bytes());

        for line in self.body_lines() {
            dst.put_slice(line.as_bytes());
            dst.put_slice(WIRE_LINE_END.as_bytes());
        }
    }

    /// Wire form as bytes.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.write_to(&mut buf);
        buf.freeze()
    }
}

impl fmt::Display for EventFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

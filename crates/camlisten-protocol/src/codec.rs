//! Tokio codec for the camera event feed.
//!
//! This module provides the line source that sits between an async byte
//! stream (the HTTP response body of a camera) and the [`StreamParser`].
//!
//! # Overview
//!
//! `EventStreamCodec` implements:
//! - [`Decoder`]: splits bytes on `\n`, cleans each line and feeds it to the
//!   parser, yielding one [`RawRecord`] per completed record
//! - [`Encoder<EventFrame>`]: writes device records in wire form
//!
//! # Architecture
//!
//! ```text
//! HTTP body -> Decoder -> line -> StreamParser -> RawRecord
//! EventFrame -> Encoder -> bytes (simulated device)
//! ```
//!
//! # Line Cleaning
//!
//! Lines are decoded as UTF-8 with invalid sequences replaced, then stripped
//! of surrounding whitespace and NUL padding. Devices terminate lines with
//! `\r\n` and pad records with NUL bytes, neither of which the parser should
//! see.
//!
//! # Memory Bound
//!
//! A line longer than the configured maximum (default 8 KB) is thrown away
//! up to its newline and the parser resynchronises at the next boundary.
//! This is a framing anomaly, not an error: the decoder keeps going.
//!
//! # Usage with Tokio FramedRead
//!
//! ```rust,no_run
//! use camlisten_protocol::{EventStreamCodec, PayloadDecoder};
//! use futures::StreamExt;
//! use tokio::net::TcpStream;
//! use tokio_util::codec::FramedRead;
//!
//! # async fn example() -> camlisten_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:8080").await?;
//! let mut records = FramedRead::new(stream, EventStreamCodec::new());
//!
//! while let Some(record) = records.next().await {
//!     match PayloadDecoder::decode("driveway", record?.as_str()) {
//!         Ok(event) => println!("{event}"),
//!         Err(e) => eprintln!("Skipping record: {e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::{EventFrame, ParserState, RawRecord, StreamParser};
use camlisten_core::{Error, Result, constants::MAX_LINE_LENGTH};

/// Tokio codec turning the camera feed into records.
///
/// One codec belongs to one connection; it owns that connection's
/// [`StreamParser`].
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use camlisten_protocol::EventStreamCodec;
/// use tokio_util::codec::Decoder;
///
/// let mut codec = EventStreamCodec::new();
/// let mut buf = BytesMut::from(
///     &b"--myboundary\r\nContent-Type: text/plain\r\n\r\nCode=AlarmLocal;action=Start;index=1\r\n"[..],
/// );
///
/// let record = codec.decode(&mut buf).unwrap().unwrap();
/// assert_eq!(record.as_str(), "Code=AlarmLocal;action=Start;index=1");
/// ```
#[derive(Debug)]
pub struct EventStreamCodec {
    /// Record state machine fed one line at a time.
    parser: StreamParser,

    /// Longest accepted line, in bytes, excluding the `\r\n` line ending.
    max_line_length: usize,

    /// Index in the buffer up to which no newline has been found.
    next_index: usize,

    /// Whether the rest of an overlong line is being skipped.
    discarding: bool,
}

impl EventStreamCodec {
    /// Create a codec with the default maximum line length (8 KB).
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length.
    ///
    /// # Example
    ///
    /// ```
    /// use camlisten_protocol::EventStreamCodec;
    ///
    /// let codec = EventStreamCodec::with_max_line_length(64 * 1024);
    /// assert_eq!(codec.max_line_length(), 64 * 1024);
    /// ```
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            parser: StreamParser::new(),
            max_line_length,
            next_index: 0,
            discarding: false,
        }
    }

    /// Get the current maximum line length.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// State of the underlying parser.
    pub fn parser_state(&self) -> ParserState {
        self.parser.state()
    }

    /// Strip line-end, whitespace and NUL padding from a raw line.
    fn clean_line(raw: &[u8]) -> String {
        String::from_utf8_lossy(raw)
            .trim_matches(|c: char| c.is_whitespace() || c == '\0')
            .to_string()
    }

    /// Feed one raw line to the parser.
    fn feed(&mut self, raw: &[u8]) -> Option<RawRecord> {
        let line = Self::clean_line(raw);
        self.parser.feed_line(&line)
    }
}

impl Default for EventStreamCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for EventStreamCodec {
    type Item = RawRecord;
    type Error = Error;

    /// Decode the next record from the byte stream.
    ///
    /// Consumes complete lines until one completes a record. Bytes of an
    /// unfinished line stay in `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RawRecord))` - A record was completed
    /// - `Ok(None)` - Need more data
    ///
    /// Framing problems never produce an error.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            if self.discarding {
                match src.iter().position(|b| *b == b'\n') {
                    Some(offset) => {
                        src.advance(offset + 1);
                        self.discarding = false;
                        self.next_index = 0;
                    }
                    None => {
                        src.clear();
                        return Ok(None);
                    }
                }
                continue;
            }

            // Room for the line, its `\r` and its `\n`
            let limit = self.max_line_length.saturating_add(2);
            let read_to = src.len().min(limit);
            let newline = src[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n');

            match newline {
                Some(offset) => {
                    let newline_index = self.next_index + offset;
                    self.next_index = 0;
                    let line = src.split_to(newline_index + 1);
                    let content = &line[..newline_index];
                    let content = content.strip_suffix(b"\r").unwrap_or(content);

                    if content.len() > self.max_line_length {
                        warn!(
                            length = content.len(),
                            max_line_length = self.max_line_length,
                            "Line too long, skipping to next boundary"
                        );
                        self.parser.resynchronize();
                        continue;
                    }
                    if let Some(record) = self.feed(content) {
                        return Ok(Some(record));
                    }
                }
                None if src.len() >= limit => {
                    warn!(
                        max_line_length = self.max_line_length,
                        "Line too long, skipping to next boundary"
                    );
                    self.discarding = true;
                    self.next_index = 0;
                    self.parser.resynchronize();
                }
                None => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    /// Decode at end of input.
    ///
    /// A final line without a newline is still fed to the parser. A record
    /// left incomplete is dropped.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(record) = self.decode(buf)? {
            return Ok(Some(record));
        }

        self.next_index = 0;
        if buf.is_empty() || self.discarding {
            buf.clear();
            self.discarding = false;
            return Ok(None);
        }

        let line = buf.split();
        Ok(self.feed(&line))
    }
}

impl Encoder<EventFrame> for EventStreamCodec {
    type Error = Error;

    /// Write a record in wire form.
    ///
    /// # Errors
    ///
    /// Returns `Error::LineTooLong` if any wire line, headers included,
    /// exceeds the maximum line length; nothing is written in that case.
    fn encode(&mut self, item: EventFrame, dst: &mut BytesMut) -> Result<()> {
        let wire = item.to_bytes();
        if let Some(line) = wire
            .split(|b| *b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .find(|line| line.len() > self.max_line_length)
        {
            return Err(Error::LineTooLong {
                length: line.len(),
                max_length: self.max_line_length,
            });
        }

        dst.extend_from_slice(&wire);
        Ok(())
    }
}

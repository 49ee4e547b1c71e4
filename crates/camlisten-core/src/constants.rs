//! Core constants for the camera event stream protocol.
//!
//! The camera event endpoint keeps an HTTP response open and writes a loosely
//! framed, line-oriented multipart feed into it. Every record is introduced by
//! a boundary line followed by a small header section:
//!
//! ```text
//! --myboundary
//! Content-Type: text/plain
//! Content-Length: 37
//!
//! Code=VideoMotionInfo;action=State;index=0
//! ```
//!
//! Records carrying detail data end their first payload line with `;data={`
//! and continue with a JSON body closed by a line holding only `}`:
//!
//! ```text
//! Code=SmartMotionVehicle;action=Start;index=0;data={
//!    "RegionName" : [ "Area1" ],
//!    "object" : [ { "Rect" : [4576,5000,4984,5256], "VehicleID" : 13421 } ]
//! }
//! ```
//!
//! The `Content-Length` header does not match the payload size on real
//! devices and is never consulted.
//!
//! # Delimiter Semantics
//!
//! | Constant | Value | Purpose |
//! |----------|-------|---------|
//! | [`BOUNDARY_MARKER`] | `--myboundary` | Starts a record, the only resynchronisation point |
//! | [`JSON_PAYLOAD_SUFFIX`] | `;data={` | First payload line announces a JSON body |
//! | [`JSON_CLOSING_LINE`] | `}` | Closes a JSON body |
//! | [`FIELD_DELIMITER`] | `;` | Separates `key=value` fields |
//! | [`KEY_VALUE_SEPARATOR`] | `=` | Separates a field key from its value |

use std::time::Duration;

// ============================================================================
// Stream Framing
// ============================================================================

/// Multipart boundary line that starts every record.
///
/// A line must be exactly equal to this marker (after trimming) to count as a
/// boundary. Lines that merely contain it are ordinary content.
///
/// # Examples
///
/// ```
/// use camlisten_core::constants::BOUNDARY_MARKER;
///
/// assert_eq!("--myboundary", BOUNDARY_MARKER);
/// assert_ne!("--myboundary--", BOUNDARY_MARKER);
/// ```
pub const BOUNDARY_MARKER: &str = "--myboundary";

/// Suffix of a first payload line that is followed by a JSON body.
///
/// # Examples
///
/// ```
/// use camlisten_core::constants::JSON_PAYLOAD_SUFFIX;
///
/// let line = "Code=SmartMotionVehicle;action=Start;index=0;data={";
/// assert!(line.ends_with(JSON_PAYLOAD_SUFFIX));
/// ```
pub const JSON_PAYLOAD_SUFFIX: &str = ";data={";

/// Line that closes a JSON body.
pub const JSON_CLOSING_LINE: &str = "}";

/// Character that opens the embedded JSON fragment of a record.
pub const JSON_START: char = '{';

/// Maximum number of non-closing lines accepted inside a JSON body.
///
/// A body that has not been closed after this many lines is abandoned and
/// the parser waits for the next boundary.
pub const MAX_JSON_LINES: usize = 10;

/// Maximum length of a single line on the wire, in bytes.
///
/// Longer lines are dropped up to the next newline so a device that never
/// sends a newline cannot grow the read buffer without bound.
pub const MAX_LINE_LENGTH: usize = 8 * 1024; // 8 KB

/// Separator placed between accumulated lines of a multi-line record.
pub const RECORD_LINE_SEPARATOR: char = '\n';

// ============================================================================
// Payload Fields
// ============================================================================

/// Separator between payload fields.
///
/// # Examples
///
/// ```
/// use camlisten_core::constants::FIELD_DELIMITER;
///
/// let payload = "Code=VideoMotionInfo;action=State;index=0";
/// let fields: Vec<&str> = payload.split(FIELD_DELIMITER).collect();
/// assert_eq!(fields.len(), 3);
/// ```
pub const FIELD_DELIMITER: char = ';';

/// Separator between a field key and its value.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Number of leading fields every payload must carry (code, action, index).
pub const REQUIRED_FIELD_COUNT: usize = 3;

// ============================================================================
// Device Endpoint
// ============================================================================

/// Path and query of the event attach endpoint.
///
/// The query is sent pre-encoded (`&` as `%26`, brackets as `%5B`/`%5D`),
/// which is the form the devices accept.
pub const EVENT_ATTACH_PATH: &str = "/cgi-bin/eventManager.cgi?action=attach%26codes=%5BAll%5D";

/// Content type advertised by the device in each record header.
pub const RECORD_CONTENT_TYPE: &str = "text/plain";

// ============================================================================
// Connection Management
// ============================================================================

/// Default delay before reconnecting a camera whose stream ended or failed.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Default timeout for establishing the HTTP connection to a camera.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default capacity of the shared event queue.
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 100;

/// Number of failures tolerated inside [`DEFAULT_ERROR_WINDOW`].
///
/// One more failure inside the window aborts monitoring.
pub const DEFAULT_MAX_ERRORS: usize = 3;

/// Window in which failures are counted towards [`DEFAULT_MAX_ERRORS`].
pub const DEFAULT_ERROR_WINDOW: Duration = Duration::from_secs(5);

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable naming the camera configuration file.
pub const CONFIG_PATH_ENV: &str = "CAMLISTEN_CONFIG";

/// Configuration file used when neither a flag nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "cameras.json";

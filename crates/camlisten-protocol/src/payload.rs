//! Camera record payload decoder.
//!
//! This module turns the text of one complete record into a [`CameraEvent`].
//!
//! # Payload Format
//!
//! ```text
//! Code=<code>;action=<action>;index=<index>[;data={<json>...}]
//! ```
//!
//! - Everything from the first `{` to the end is the JSON detail fragment,
//!   kept verbatim and never validated.
//! - The text before it is split on `;`. The first three fields must be
//!   `key=value` pairs; their values are, in order, the event code, the
//!   action and the index. Keys are not checked and further fields (such
//!   as the trailing `data=`) are ignored.
//!
//! # Examples
//!
//! ```
//! use camlisten_protocol::PayloadDecoder;
//!
//! let event = PayloadDecoder::decode("driveway", "Code=VideoMotionInfo;action=State;index=0").unwrap();
//! assert_eq!(event.code(), "VideoMotionInfo");
//! assert_eq!(event.action(), "State");
//! assert_eq!(event.index(), "0");
//! assert!(event.data().is_none());
//!
//! // Missing index
//! assert!(PayloadDecoder::decode("driveway", "Code=Foo;action=Bar").is_err());
//! ```

use crate::event::CameraEvent;
use camlisten_core::{
    Error, Result,
    constants::{FIELD_DELIMITER, JSON_START, KEY_VALUE_SEPARATOR, REQUIRED_FIELD_COUNT},
};
use chrono::Utc;

/// Decoder for record payloads.
pub struct PayloadDecoder;

impl PayloadDecoder {
    /// Decode one record into an event stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `camera` - Camera name to attach to the event
    /// * `raw` - Complete record text as produced by the stream parser
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - Fewer than three fields precede the JSON fragment (`MissingField`)
    /// - One of the first three fields has no `=` (`MissingSeparator`)
    ///
    /// A failure concerns this record only; callers log it and carry on.
    ///
    /// # Examples
    ///
    /// ```
    /// use camlisten_protocol::PayloadDecoder;
    ///
    /// let raw = "Code=SmartMotionVehicle;action=Start;index=0;data={\n\"VehicleID\" : 13421\n}";
    /// let event = PayloadDecoder::decode("gate", raw).unwrap();
    ///
    /// assert_eq!(event.code(), "SmartMotionVehicle");
    /// assert_eq!(event.data(), Some("{\n\"VehicleID\" : 13421\n}"));
    /// ```
    pub fn decode(camera: &str, raw: &str) -> Result<CameraEvent> {
        let (prefix, data) = Self::split_data(raw);
        let [code, action, index] = Self::required_values(prefix)?;

        Ok(CameraEvent::new(
            camera,
            Utc::now(),
            code,
            action,
            index,
            data.map(str::to_string),
            raw,
        ))
    }

    /// Split a record into its field prefix and optional JSON fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use camlisten_protocol::PayloadDecoder;
    ///
    /// let (prefix, data) = PayloadDecoder::split_data("Code=A;action=B;index=0;data={}");
    /// assert_eq!(prefix, "Code=A;action=B;index=0;data=");
    /// assert_eq!(data, Some("{}"));
    ///
    /// let (prefix, data) = PayloadDecoder::split_data("Code=A;action=B;index=0");
    /// assert_eq!(prefix, "Code=A;action=B;index=0");
    /// assert_eq!(data, None);
    /// ```
    pub fn split_data(raw: &str) -> (&str, Option<&str>) {
        match raw.find(JSON_START) {
            Some(pos) => (&raw[..pos], Some(&raw[pos..])),
            None => (raw, None),
        }
    }

    /// Take the values of the leading code, action and index fields.
    fn required_values(prefix: &str) -> Result<[&str; REQUIRED_FIELD_COUNT]> {
        let mut fields = prefix.split(FIELD_DELIMITER);
        let mut values = [""; REQUIRED_FIELD_COUNT];

        for (position, value) in values.iter_mut().enumerate() {
            let field = fields.next().ok_or_else(|| Error::MissingField {
                position,
                payload: prefix.to_string(),
            })?;
            *value = Self::field_value(field, position)?;
        }

        Ok(values)
    }

    /// Value half of a `key=value` field, split on the first `=`.
    fn field_value(field: &str, position: usize) -> Result<&str> {
        field
            .split_once(KEY_VALUE_SEPARATOR)
            .map(|(_, value)| value)
            .ok_or_else(|| Error::MissingSeparator {
                position,
                field: field.to_string(),
            })
    }
}

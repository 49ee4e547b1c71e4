use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event decoded from one camera record.
///
/// Built once per successfully decoded record and never modified afterwards;
/// ownership moves to whoever receives it from the event queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraEvent {
    camera: String,
    timestamp: DateTime<Utc>,
    code: String,
    action: String,
    index: String,
    data: Option<String>,
    raw: String,
}

impl CameraEvent {
    pub fn new(
        camera: impl Into<String>,
        timestamp: DateTime<Utc>,
        code: impl Into<String>,
        action: impl Into<String>,
        index: impl Into<String>,
        data: Option<String>,
        raw: impl Into<String>,
    ) -> Self {
        CameraEvent {
            camera: camera.into(),
            timestamp,
            code: code.into(),
            action: action.into(),
            index: index.into(),
            data,
            raw: raw.into(),
        }
    }

    /// Name of the camera that produced the event (from configuration).
    pub fn camera(&self) -> &str {
        &self.camera
    }

    /// When the record was decoded.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Event type, e.g. `VideoMotion`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Event state, e.g. `Start`, `Stop`, `State`.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Channel or rule index. Kept as text, some devices send non-numeric values.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Raw JSON detail fragment, starting at `{`. Not validated.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Record text exactly as assembled from the stream.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for CameraEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.camera,
            self.timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S"),
            self.code,
            self.action
        )
    }
}

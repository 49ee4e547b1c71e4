use crate::constants::EVENT_ATTACH_PATH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection settings for one camera, as read from configuration.
///
/// Keys are lower case; the PascalCase spelling (`Name`, `Addr`, `User`,
/// `Pass`) is accepted as well.
///
/// # Examples
///
/// ```
/// use camlisten_core::CameraSettings;
///
/// let camera = CameraSettings::new("driveway", "192.168.1.40", "admin", "secret");
/// assert_eq!(camera.display_name(), "driveway (192.168.1.40)");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Name used to label events and to select the camera on the command line.
    #[serde(alias = "Name")]
    pub name: String,

    /// Host name or address, optionally with a port.
    #[serde(alias = "Addr")]
    pub addr: String,

    /// Login user.
    #[serde(alias = "User", default)]
    pub user: String,

    /// Login password.
    #[serde(alias = "Pass", default)]
    pub pass: String,
}

impl CameraSettings {
    pub fn new(
        name: impl Into<String>,
        addr: impl Into<String>,
        user: impl Into<String>,
        pass: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// Human-readable `Name (Addr)` label.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.addr)
    }

    /// URL of the event attach endpoint for this camera.
    ///
    /// # Examples
    ///
    /// ```
    /// use camlisten_core::CameraSettings;
    ///
    /// let camera = CameraSettings::new("gate", "10.0.0.7", "admin", "pw");
    /// assert_eq!(
    ///     camera.event_url(),
    ///     "http://10.0.0.7/cgi-bin/eventManager.cgi?action=attach%26codes=%5BAll%5D"
    /// );
    /// ```
    #[must_use]
    pub fn event_url(&self) -> String {
        let addr = self.addr.trim();
        let addr = addr
            .split_once("://")
            .map_or(addr, |(_, rest)| rest)
            .trim_end_matches('/');
        format!("http://{addr}{EVENT_ATTACH_PATH}")
    }

    /// Whether credentials were configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty()
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Debug for CameraSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraSettings")
            .field("name", &self.name)
            .field("addr", &self.addr)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for CameraSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

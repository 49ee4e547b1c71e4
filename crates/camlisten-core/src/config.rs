//! Camera list configuration.
//!
//! The camera list is a JSON document:
//!
//! ```json
//! {
//!   "cameras": [
//!     { "name": "driveway", "addr": "192.168.1.40", "user": "admin", "pass": "secret" }
//!   ]
//! }
//! ```
//!
//! The file location is taken from, in order: an explicit path, the
//! [`CONFIG_PATH_ENV`] environment variable, then [`DEFAULT_CONFIG_PATH`].

use crate::{
    CameraSettings, Error, Result,
    constants::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed camera list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(alias = "Cameras", default)]
    pub cameras: Vec<CameraSettings>,
}

impl CameraConfig {
    /// Parse and validate a configuration document.
    ///
    /// # Errors
    /// Returns `Error::Config` for malformed JSON or an empty camera list, and
    /// `Error::MissingConfig` when a camera lacks a name or address.
    ///
    /// # Examples
    ///
    /// ```
    /// use camlisten_core::config::CameraConfig;
    ///
    /// let config = CameraConfig::from_json(
    ///     r#"{"cameras":[{"name":"gate","addr":"10.0.0.7","user":"admin","pass":"pw"}]}"#,
    /// ).unwrap();
    /// assert_eq!(config.cameras.len(), 1);
    ///
    /// assert!(CameraConfig::from_json(r#"{"cameras":[]}"#).is_err());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CameraConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the errors of
    /// [`CameraConfig::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading camera configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Resolve the configuration file location.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Pick the cameras to monitor.
    ///
    /// With no name every configured camera is returned; with a name only the
    /// camera matching it case-insensitively.
    ///
    /// # Errors
    /// Returns `Error::UnknownCamera` when no camera matches the name.
    pub fn select(&self, name: Option<&str>) -> Result<Vec<CameraSettings>> {
        match name {
            None => Ok(self.cameras.clone()),
            Some(name) => self
                .cameras
                .iter()
                .find(|camera| camera.matches_name(name))
                .map(|camera| vec![camera.clone()])
                .ok_or_else(|| Error::UnknownCamera(name.to_string())),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.cameras.is_empty() {
            return Err(Error::Config(
                "No cameras defined in configuration".to_string(),
            ));
        }
        for (i, camera) in self.cameras.iter().enumerate() {
            if camera.name.trim().is_empty() {
                return Err(Error::MissingConfig(format!("cameras[{i}].name")));
            }
            if camera.addr.trim().is_empty() {
                return Err(Error::MissingConfig(format!("cameras[{i}].addr")));
            }
            if let Some((scheme, _)) = camera.addr.trim().split_once("://")
                && !scheme.eq_ignore_ascii_case("http")
            {
                return Err(Error::Config(format!(
                    "cameras[{i}].addr: unsupported scheme '{scheme}'"
                )));
            }
        }
        Ok(())
    }
}

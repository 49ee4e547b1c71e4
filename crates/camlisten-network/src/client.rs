//! HTTP client for the camera event attach endpoint.
//!
//! This module opens the long-lived event stream of a camera and exposes
//! the response body as an [`AsyncRead`](tokio::io::AsyncRead), ready to be framed with
//! [`EventStreamCodec`](camlisten_protocol::EventStreamCodec).
//!
//! # Architecture
//!
//! ```text
//! CameraListener
//!     │
//!     └─> CameraClient ───(HTTP GET)───> Camera
//!             │
//!             └─> EventBody (AsyncRead over the response body)
//! ```
//!
//! # Design Principles
//!
//! - **No automatic retry**: the monitor decides when to reconnect
//! - **No request timeout**: the device holds the response open between
//!   events, so only connecting is time-limited
//! - **Basic credentials**: sent when a user is configured

use bytes::Bytes;
use camlisten_core::{CameraSettings, constants::DEFAULT_CONNECT_TIMEOUT};
use futures::{Stream, TryStreamExt};
use std::io;
use std::pin::Pin;
use std::time::Duration;
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};

use crate::ListenerError;

/// Response body of an event stream, readable as bytes.
pub type EventBody = StreamReader<Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>, Bytes>;

/// Configuration for the camera HTTP client
///
/// # Example
///
/// ```
/// use camlisten_network::CameraClientConfig;
/// use std::time::Duration;
///
/// let config = CameraClientConfig {
///     connect_timeout: Duration::from_secs(3),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CameraClientConfig {
    /// Time allowed to establish the TCP connection
    pub connect_timeout: Duration,
}

impl Default for CameraClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// HTTP client opening camera event streams.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct CameraClient {
    http: reqwest::Client,
}

impl CameraClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ListenerError::Client` if the TLS backend cannot be
    /// initialised.
    pub fn new(config: CameraClientConfig) -> Result<Self, ListenerError> {
        debug!(
            connect_timeout_ms = config.connect_timeout.as_millis() as u64,
            "Creating camera HTTP client"
        );

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(ListenerError::Client)?;

        Ok(Self { http })
    }

    /// Open the event stream of a camera.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The camera cannot be reached (`Connect`)
    /// - The camera answers with a non-success status (`HttpStatus`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use camlisten_core::CameraSettings;
    /// use camlisten_network::{CameraClient, CameraClientConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = CameraClient::new(CameraClientConfig::default())?;
    /// let camera = CameraSettings::new("gate", "10.0.0.7", "admin", "pw");
    /// let body = client.connect(&camera).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(&self, camera: &CameraSettings) -> Result<EventBody, ListenerError> {
        let url = camera.event_url();
        info!(camera = %camera.name, addr = %camera.addr, "Connecting to camera");

        let mut request = self.http.get(&url);
        if camera.has_credentials() {
            request = request.basic_auth(&camera.user, Some(&camera.pass));
        }

        let response = request
            .send()
            .await
            .map_err(|source| ListenerError::Connect {
                camera: camera.name.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(camera = %camera.name, status = status.as_u16(), "Camera refused event stream");
            return Err(ListenerError::HttpStatus {
                camera: camera.name.clone(),
                status: status.as_u16(),
            });
        }

        info!(camera = %camera.name, "Connected");
        let body: Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>> =
            Box::pin(response.bytes_stream().map_err(io::Error::other));
        Ok(StreamReader::new(body))
    }
}

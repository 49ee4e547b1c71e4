use thiserror::Error;

/// Errors that end one connection to a camera.
///
/// None of these stop the monitor by themselves; it reports them and
/// reconnects.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    /// Request could not be sent or no response arrived
    #[error("Connection to {camera} failed: {source}")]
    Connect {
        camera: String,
        #[source]
        source: reqwest::Error,
    },

    /// Camera answered with a non-success status
    #[error("Camera {camera} answered HTTP {status}")]
    HttpStatus { camera: String, status: u16 },

    /// Event stream read failed after connecting
    #[error("Stream read failed: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the protocol layer
    #[error("Protocol error: {0}")]
    Protocol(#[from] camlisten_core::Error),
}

impl ListenerError {
    /// Whether the camera refused the credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ListenerError::HttpStatus { status: 401 | 403, .. })
    }
}

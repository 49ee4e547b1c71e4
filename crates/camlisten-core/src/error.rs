use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Payload errors
    #[error("Missing payload field {position} in {payload:?}")]
    MissingField { position: usize, payload: String },

    #[error("Payload field {position} has no '=' separator: {field:?}")]
    MissingSeparator { position: usize, field: String },

    // Stream errors
    #[error("Line too long: {length} bytes exceeds {max_length}")]
    LineTooLong { length: usize, max_length: usize },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    #[error("No camera named {0:?} in configuration")]
    UnknownCamera(String),
}

impl Error {
    /// Whether the error concerns a single record and should not stop the stream.
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. } | Error::MissingSeparator { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

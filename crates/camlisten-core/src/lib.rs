pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::CameraConfig;
pub use error::{Error, Result};
pub use types::*;

//! Error types for the business card
//!
//! The interaction core never fails: measurement problems and missing
//! environment signals are handled in-band. Errors only arise at the edges
//! (config loading, frame encoding, shared-state locks).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CardError>;

#[derive(Error, Debug)]
pub enum CardError {
    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Frame encoding errors
    #[error("Encode error: {0}")]
    Encode(String),

    /// A shared-state mutex was poisoned by a panicking thread
    #[error("Shared state poisoned: {0}")]
    LockPoisoned(&'static str),

    /// No frame has been rendered yet
    #[error("No frame yet (scene still loading)")]
    FrameNotReady,
}

impl From<image::ImageError> for CardError {
    fn from(err: image::ImageError) -> Self {
        CardError::Encode(err.to_string())
    }
}

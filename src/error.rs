//! Error types for amrwav

use thiserror::Error;

/// Result type alias for amrwav operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for amrwav
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed container structure
    #[error("Format error: {0}")]
    Format(String),

    /// Unrecognized or unsupported container layout (bad magic, missing
    /// chunk, truncated buffer, unsupported channel/bit-depth, bad frame type)
    #[error("Unsupported format: {0}")]
    Unsupported(String),

    /// Codec engine error
    #[error("Codec error: {0}")]
    Codec(String),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create an unsupported-format error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create a codec error
    pub fn codec<S: Into<String>>(msg: S) -> Self {
        Error::Codec(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// True for structural container failures
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }
}

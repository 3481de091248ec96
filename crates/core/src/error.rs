use thiserror::Error;

/// Result type alias for skillshelf-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types shared by the skillshelf crates
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage layout errors
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Validation errors for user supplied values
    #[error("validation error: {0}")]
    Validation(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Errors resolving the fixed filesystem locations
#[derive(Debug, Error)]
pub enum LayoutError {
    /// No home directory could be determined for the current user
    #[error("could not determine home directory")]
    NoHomeDir,
}

impl Error {
    /// Create a validation error with a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a generic error with a message
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

//! Error types for zbib-core

use thiserror::Error;

/// Result type alias using zbib-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in zbib-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required connection parameter is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a failure status
    #[error("Remote error: {0}")]
    Remote(String),
}

/// Core error types for NeriPlayer
use thiserror::Error;

/// Result type alias using `NeriError`
pub type Result<T> = std::result::Result<T, NeriError>;

/// Core error type for NeriPlayer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NeriError {
    /// Quality name is not one of the known levels
    #[error("Unknown quality level: {0}")]
    UnknownQuality(String),

    /// Platform name is not one of the known platforms
    #[error("Unknown music platform: {0}")]
    UnknownPlatform(String),
}

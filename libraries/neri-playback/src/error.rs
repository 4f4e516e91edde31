//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// A playlist with no songs was requested
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (queue length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Too many songs in a row could not be played
    #[error("Stopped after {0} consecutive playback failures")]
    ExceededFailureCap(u32),

    /// Operation needs a current song
    #[error("No song is currently selected")]
    NoCurrentSong,

    /// The playback manager task is gone
    #[error("Playback manager is closed")]
    ManagerClosed,

    /// Favorites or playlist store failed
    #[error("Playlist store error: {0}")]
    Store(#[from] ApiError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Errors reported by platform clients and local stores
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be completed
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with something unexpected
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// Local store failure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

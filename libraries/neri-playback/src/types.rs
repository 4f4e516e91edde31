//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Failures in a row after which playback is halted
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 10;

/// Default position polling period
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(40);

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing requested yet
    #[default]
    Idle,

    /// Looking up a playable URL for the current song
    Resolving,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Queue finished or playback halted; the queue is cleared
    Stopped,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the queue ends
    #[default]
    Off,

    /// Loop the entire queue
    All,

    /// Loop the current song only
    One,
}

impl RepeatMode {
    /// Next mode in the Off -> All -> One -> Off cycle
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

/// What the underlying media player is asked to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Song id as a string
    pub media_id: String,

    /// Resolved stream URL or `file://` path
    pub url: String,

    /// Quality-aware cache key
    pub cache_key: String,
}

/// Errors reported by the underlying media player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerErrorKind {
    /// The player was handed an unusable URL
    InvalidUrl,

    /// Network connection failed while streaming
    NetworkConnection,

    /// Anything else, named by the player
    Other(String),
}

impl PlayerErrorKind {
    /// Message shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl => "Invalid playback URL. Try logging in or switching quality, \
                                 or check that you have access to this song"
                .to_string(),
            Self::NetworkConnection => {
                "Network connection failed, check your network and try again".to_string()
            }
            Self::Other(code) => format!("Playback failed: {}", code),
        }
    }
}

/// Configuration for the playback manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Failures in a row before playback halts (default: 10)
    pub max_consecutive_failures: u32,

    /// Position polling period while playing (default: 40ms)
    pub progress_interval: Duration,

    /// Where the queue is persisted; `None` disables persistence
    pub state_file: Option<PathBuf>,

    /// Fixed shuffle seed, for reproducible runs
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            state_file: None,
            shuffle_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.max_consecutive_failures, 10);
        assert_eq!(config.progress_interval, Duration::from_millis(40));
        assert!(config.state_file.is_none());
        assert!(config.shuffle_seed.is_none());
    }

    #[test]
    fn repeat_mode_cycles() {
        assert_eq!(RepeatMode::Off.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::Off);
    }

    #[test]
    fn player_error_messages() {
        assert!(PlayerErrorKind::NetworkConnection
            .user_message()
            .contains("Network"));
        assert_eq!(
            PlayerErrorKind::Other("ERROR_CODE_DECODING_FAILED".to_string()).user_message(),
            "Playback failed: ERROR_CODE_DECODING_FAILED"
        );
    }
}

//! Playback Events
//!
//! Two kinds of observation are offered to the UI layer:
//! - [`PlayerSnapshot`] through a `watch` channel: the latest full state
//!   (queue, current song, modes), replaced on every change
//! - [`PlayerEvent`] through a `broadcast` channel: one-shot notifications
//!   such as login prompts and errors

use crate::types::{PlaybackState, RepeatMode};
use neri_core::Song;
use serde::{Deserialize, Serialize};

/// Notifications emitted by the playback system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The platform refused the song until the user logs in
    ShowLoginPrompt {
        message: String,
    },

    /// Something failed; playback continues with the next song when possible
    ShowError {
        message: String,
    },

    /// Too many songs in a row failed; the queue was cleared
    PlaybackHalted {
        /// Failures counted when playback stopped
        failures: u32,
    },
}

/// Latest observable playback state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,

    pub queue: Vec<Song>,

    pub current_index: Option<usize>,

    pub current_song: Option<Song>,

    pub shuffle_enabled: bool,

    pub repeat_mode: RepeatMode,

    /// URL actually handed to the media player, for source display
    pub media_url: Option<String>,
}

impl PlayerSnapshot {
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn has_items(&self) -> bool {
        !self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_idle_and_empty() {
        let snapshot = PlayerSnapshot::default();
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert!(!snapshot.is_playing());
        assert!(!snapshot.has_items());
        assert_eq!(snapshot.repeat_mode, RepeatMode::Off);
    }

    #[test]
    fn events_serialize_with_variant_names() {
        let json = serde_json::to_string(&PlayerEvent::PlaybackHalted { failures: 10 }).unwrap();
        assert_eq!(json, r#"{"PlaybackHalted":{"failures":10}}"#);
    }
}
